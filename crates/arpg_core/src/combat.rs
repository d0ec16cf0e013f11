//! Combat resolution: to-hit and damage formulas.
//!
//! This module implements the probability/damage math behind every
//! attack:
//! - To-hit chances are hard-clamped to [5, 95] percent
//! - Damage is always non-negative
//! - Attacker-side inputs for ranged attacks come from an immutable
//!   snapshot captured at cast time; defender armor is read live at impact
//! - Every roll consumes the shared deterministic stream in a fixed order
//!
//! All formulas are integer math over stats; no floating point.

use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::player::PlayerClass;
use crate::rng::GameRng;

/// Lower clamp bound for to-hit chances. Hard invariant: no attack ever
/// resolves with less than a 5% chance to connect.
pub const TO_HIT_MIN: i32 = 5;

/// Upper clamp bound for to-hit chances. Hard invariant: no attack ever
/// resolves with more than a 95% chance to connect.
pub const TO_HIT_MAX: i32 = 95;

/// Flat base added to every to-hit computation.
const TO_HIT_BASE: i32 = 50;

/// Compute a clamped to-hit chance from its raw terms.
///
/// Formula:
/// ```text
/// chance = clamp(base + bonuses - armor + level + class_bonus, 5, 95)
/// ```
#[must_use]
pub fn to_hit_chance(
    base: i32,
    attacker_bonuses: i32,
    defender_armor: i32,
    attacker_level: i32,
    class_bonus: i32,
) -> i32 {
    (base + attacker_bonuses - defender_armor + attacker_level + class_bonus)
        .clamp(TO_HIT_MIN, TO_HIT_MAX)
}

/// Melee to-hit chance between two live actors.
///
/// Attacker bonuses are `dexterity / 2` plus gear armor penetration; the
/// defender contributes current armor only.
#[must_use]
pub fn melee_to_hit_chance(attacker: &Actor, defender: &Actor) -> i32 {
    let class_bonus = attacker
        .player
        .map_or(0, |progress| progress.class.to_hit_bonus());
    to_hit_chance(
        TO_HIT_BASE,
        attacker.dexterity / 2 + attacker.gear.armor_penetration,
        defender.armor(),
        attacker.level(),
        class_bonus,
    )
}

/// Resolve one to-hit check against a pre-computed chance.
///
/// Draws exactly one uniform integer in `[0, 100)`; hit iff
/// `roll < chance`.
pub fn check_hit(rng: &mut GameRng, chance: i32) -> bool {
    rng.roll_percent() < chance
}

/// Inputs to the melee damage roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeDamage {
    /// Minimum weapon damage.
    pub min_attack_damage: i32,
    /// Maximum weapon damage.
    pub max_attack_damage: i32,
    /// Percentage damage bonus.
    pub percent_damage_bonus: i32,
    /// Character base damage, added after scaling.
    pub base_damage: i32,
    /// Flat damage bonus, added after scaling.
    pub flat_damage_bonus: i32,
    /// Attacker level; drives the warrior critical-hit chance.
    pub attacker_level: i32,
    /// Attacker class, if a player.
    pub class: Option<PlayerClass>,
}

impl MeleeDamage {
    /// Gather melee damage inputs from a live actor.
    #[must_use]
    pub fn for_actor(actor: &Actor) -> Self {
        Self {
            min_attack_damage: actor.gear.min_attack_damage,
            max_attack_damage: actor.gear.max_attack_damage,
            percent_damage_bonus: actor.gear.percent_damage_bonus,
            base_damage: actor.base_damage,
            flat_damage_bonus: actor.gear.flat_damage_bonus,
            attacker_level: actor.level(),
            class: actor.player.map(|progress| progress.class),
        }
    }
}

/// Roll melee damage.
///
/// Formula:
/// ```text
/// dmg = uniform(min..=max)
/// dmg += dmg * percent_bonus / 100
/// dmg += base_damage + flat_bonus
/// warriors: dmg *= 2 when an independent uniform(0,100) < level
/// result clamped to >= 0
/// ```
///
/// Consumes one draw for the weapon roll, plus one more for the critical
/// check when the class has it.
pub fn roll_melee_damage(rng: &mut GameRng, input: &MeleeDamage) -> i32 {
    let mut dmg = rng.in_range_inclusive(input.min_attack_damage, input.max_attack_damage);
    dmg += dmg * input.percent_damage_bonus / 100;
    dmg += input.base_damage;
    dmg += input.flat_damage_bonus;

    if input.class.is_some_and(PlayerClass::has_critical_hits)
        && rng.roll_percent() < input.attacker_level
    {
        dmg *= 2;
    }

    dmg.max(0)
}

/// Combat-relevant stats frozen at the moment of casting.
///
/// A missile resolves its hits from this record, never from the caster's
/// live stats: equipment or stat changes after the cast cannot alter an
/// attack already in flight. The clamp bounds travel with the snapshot so
/// a restored missile resolves identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorStatsSnapshot {
    /// Attacker-side to-hit sum (base + dexterity/2 + penetration +
    /// level + class bonus). Defender armor is subtracted at impact.
    pub to_hit_base: i32,
    /// Lower to-hit clamp bound.
    pub to_hit_min: i32,
    /// Upper to-hit clamp bound.
    pub to_hit_max: i32,
    /// Resolved flat damage (character base + flat gear bonus).
    pub damage: i32,
    /// Lower bound of the weapon damage roll, percent bonus applied.
    pub damage_bonus_min: i32,
    /// Upper bound of the weapon damage roll, percent bonus applied.
    pub damage_bonus_max: i32,
}

impl ActorStatsSnapshot {
    /// Capture the caster's combat-relevant stats.
    #[must_use]
    pub fn capture(actor: &Actor) -> Self {
        let class_bonus = actor
            .player
            .map_or(0, |progress| progress.class.to_hit_bonus());
        let percent = actor.gear.percent_damage_bonus;
        let with_percent = |d: i32| d + d * percent / 100;

        Self {
            to_hit_base: TO_HIT_BASE
                + actor.dexterity / 2
                + actor.gear.armor_penetration
                + actor.level()
                + class_bonus,
            to_hit_min: TO_HIT_MIN,
            to_hit_max: TO_HIT_MAX,
            damage: actor.base_damage + actor.gear.flat_damage_bonus,
            damage_bonus_min: with_percent(actor.gear.min_attack_damage),
            damage_bonus_max: with_percent(actor.gear.max_attack_damage),
        }
    }

    /// To-hit chance against a defender's live armor, clamped to the
    /// captured bounds.
    #[must_use]
    pub fn ranged_to_hit_chance(&self, defender_armor: i32) -> i32 {
        (self.to_hit_base - defender_armor).clamp(self.to_hit_min, self.to_hit_max)
    }

    /// Roll damage for an impact: captured flat damage plus one uniform
    /// draw from the captured bonus range, clamped non-negative.
    pub fn roll_ranged_damage(&self, rng: &mut GameRng) -> i32 {
        let bonus = rng.in_range_inclusive(self.damage_bonus_min, self.damage_bonus_max);
        (self.damage + bonus).max(0)
    }
}
