//! Player classes, experience and leveling.
//!
//! Experience thresholds come from a fixed quadratic table. Leveling is
//! iterative: one level-up per threshold crossed, each applying the
//! class's fixed HP/mana growth, with a full HP/mana restore after the
//! final level-up. All scaling is integer math.

use serde::{Deserialize, Serialize};

use crate::actor::Actor;

/// Maximum attainable character level.
pub const MAX_LEVEL: i32 = 50;

/// Character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    /// Melee specialist; level-scaled critical hits.
    Warrior,
    /// Ranged specialist.
    Rogue,
    /// Caster.
    Sorcerer,
}

impl PlayerClass {
    /// Display name for this class.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Warrior => "Warrior",
            Self::Rogue => "Rogue",
            Self::Sorcerer => "Sorcerer",
        }
    }

    /// Per-level (max HP, max mana) growth.
    #[must_use]
    pub const fn level_up_growth(self) -> (i32, i32) {
        match self {
            Self::Warrior => (2, 1),
            Self::Rogue => (2, 2),
            Self::Sorcerer => (1, 2),
        }
    }

    /// Flat class bonus added to to-hit chance.
    #[must_use]
    pub const fn to_hit_bonus(self) -> i32 {
        match self {
            Self::Warrior => 20,
            Self::Rogue | Self::Sorcerer => 0,
        }
    }

    /// Whether this class rolls the level-scaled critical-hit check.
    #[must_use]
    pub const fn has_critical_hits(self) -> bool {
        matches!(self, Self::Warrior)
    }
}

/// Player-only progression state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    /// Character class.
    pub class: PlayerClass,
    /// Total accumulated experience.
    pub exp: i32,
}

impl PlayerProgress {
    /// Create progression state consistent with the given starting level.
    #[must_use]
    pub const fn new(class: PlayerClass, level: i32) -> Self {
        Self {
            class,
            exp: exp_for_level(level),
        }
    }
}

/// Total experience required to hold `level`.
///
/// Level 1 is free; each level after that costs quadratically more.
#[must_use]
pub const fn exp_for_level(level: i32) -> i32 {
    let steps = level - 1;
    if steps <= 0 {
        return 0;
    }
    50 * steps * steps
}

/// The experience ceiling: no kill can push total experience past the
/// requirement for [`MAX_LEVEL`].
#[must_use]
pub const fn experience_ceiling() -> i32 {
    exp_for_level(MAX_LEVEL)
}

/// The highest level supported by `exp` total experience.
#[must_use]
pub fn level_for_exp(exp: i32) -> i32 {
    let mut level = 1;
    while level < MAX_LEVEL && exp_for_level(level + 1) <= exp {
        level += 1;
    }
    level
}

/// Scale a monster's base kill experience by the level difference with
/// the player: `kill_exp * (10 + (monster_level - player_level)) / 10`,
/// floored at zero. Matches `1 + diff/10` at every whole-number
/// difference while staying in integer math.
#[must_use]
pub fn scale_kill_exp(kill_exp: i32, monster_level: i32, player_level: i32) -> i32 {
    // Widen before multiplying; extreme kill values must saturate, not wrap.
    let scaled = i64::from(kill_exp) * i64::from(10 + (monster_level - player_level)) / 10;
    scaled.clamp(0, i64::from(i32::MAX)) as i32
}

/// Award experience for a kill and apply any resulting level-ups.
///
/// Returns the number of levels gained. Non-player actors gain nothing.
pub fn award_experience(actor: &mut Actor, kill_exp: i32, monster_level: i32) -> i32 {
    let current_level = actor.level;
    let gained = scale_kill_exp(kill_exp, monster_level, current_level);

    let Some(progress) = actor.player.as_mut() else {
        return 0;
    };
    let class = progress.class;
    progress.exp = progress.exp.saturating_add(gained).min(experience_ceiling());
    let new_level = level_for_exp(progress.exp);

    let levels_gained = (new_level - current_level).max(0);
    for _ in 0..levels_gained {
        actor.level += 1;
        let (hp, mana) = class.level_up_growth();
        actor.health.raise_max(hp);
        actor.mana.raise_max(mana);
    }

    if levels_gained > 0 {
        actor.health.restore_full();
        actor.mana.restore_full();
        tracing::debug!(
            actor = actor.id,
            level = actor.level,
            "player leveled up"
        );
    }

    levels_gained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorKind, ActorSpawnParams, ActorStorage, Faction};

    fn spawn_player(storage: &mut ActorStorage, class: PlayerClass) -> u32 {
        storage.insert(ActorSpawnParams {
            kind: ActorKind::Player,
            faction: Faction::Heaven,
            health: 30,
            mana: 10,
            level: 1,
            class: Some(class),
            ..Default::default()
        })
    }

    #[test]
    fn test_exp_table_is_monotonic() {
        for level in 1..MAX_LEVEL {
            assert!(exp_for_level(level) < exp_for_level(level + 1));
        }
    }

    #[test]
    fn test_level_for_exp_inverts_table() {
        assert_eq!(level_for_exp(0), 1);
        assert_eq!(level_for_exp(exp_for_level(2)), 2);
        assert_eq!(level_for_exp(exp_for_level(2) - 1), 1);
        assert_eq!(level_for_exp(i32::MAX), MAX_LEVEL);
    }

    #[test]
    fn test_scale_kill_exp_level_difference() {
        // Ten levels above doubles the reward.
        assert_eq!(scale_kill_exp(100, 11, 1), 200);
        // Equal levels leave it unchanged.
        assert_eq!(scale_kill_exp(100, 5, 5), 100);
        // Far below floors at zero.
        assert_eq!(scale_kill_exp(100, 1, 20), 0);
    }

    #[test]
    fn test_double_level_up_applies_both_increments_then_restores() {
        let mut storage = ActorStorage::new();
        let id = spawn_player(&mut storage, PlayerClass::Rogue);
        let actor = storage.get_mut(id).unwrap();
        actor.health.current = 5;

        // 100 base exp from a monster 10 levels up = 200 exp, which
        // crosses the level-2 (50) and level-3 (200) thresholds.
        let gained = award_experience(actor, 100, 11);

        assert_eq!(gained, 2);
        assert_eq!(actor.level, 3);
        assert_eq!(actor.player.unwrap().exp, 200);
        // Rogue grows +2 HP / +2 mana per level.
        assert_eq!(actor.health.max, 34);
        assert_eq!(actor.mana.max, 14);
        // Fully restored after the final level-up.
        assert_eq!(actor.health.current, actor.health.max);
        assert_eq!(actor.mana.current, actor.mana.max);
    }

    #[test]
    fn test_warrior_growth_rates() {
        let mut storage = ActorStorage::new();
        let id = spawn_player(&mut storage, PlayerClass::Warrior);
        let actor = storage.get_mut(id).unwrap();

        let gained = award_experience(actor, 50, 1);
        assert_eq!(gained, 1);
        assert_eq!(actor.health.max, 32);
        assert_eq!(actor.mana.max, 11);
    }

    #[test]
    fn test_no_level_up_keeps_current_vitals() {
        let mut storage = ActorStorage::new();
        let id = spawn_player(&mut storage, PlayerClass::Sorcerer);
        let actor = storage.get_mut(id).unwrap();
        actor.health.current = 7;

        let gained = award_experience(actor, 10, 1);
        assert_eq!(gained, 0);
        assert_eq!(actor.health.current, 7);
    }

    #[test]
    fn test_experience_is_capped_at_ceiling() {
        let mut storage = ActorStorage::new();
        let id = spawn_player(&mut storage, PlayerClass::Warrior);
        let actor = storage.get_mut(id).unwrap();

        award_experience(actor, i32::MAX / 2, 40);
        assert_eq!(actor.player.unwrap().exp, experience_ceiling());
        assert_eq!(actor.level, MAX_LEVEL);
    }

    #[test]
    fn test_monsters_gain_nothing() {
        let mut storage = ActorStorage::new();
        let id = storage.insert(ActorSpawnParams::default());
        let actor = storage.get_mut(id).unwrap();

        assert_eq!(award_experience(actor, 1000, 50), 0);
        assert_eq!(actor.level, 1);
    }
}
