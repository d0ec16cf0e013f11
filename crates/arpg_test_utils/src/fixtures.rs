//! Test fixtures and helpers.
//!
//! Pre-built actors and sessions for consistent testing.

use arpg_core::actor::{ActorId, ActorKind, ActorSpawnParams, Faction, GearBonus};
use arpg_core::math::Vec2Fixed;
use arpg_core::player::PlayerClass;
use arpg_core::simulation::Simulation;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a world point from integer coordinates.
#[must_use]
pub fn vec2(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::new(fixed(x), fixed(y))
}

/// Spawn parameters for a rogue archer with a plain bow.
#[must_use]
pub fn archer_params() -> ActorSpawnParams {
    ActorSpawnParams {
        kind: ActorKind::Player,
        faction: Faction::Heaven,
        position: Vec2Fixed::ZERO,
        health: 45,
        mana: 22,
        armor: 3,
        level: 4,
        dexterity: 25,
        base_damage: 2,
        gear: GearBonus {
            min_attack_damage: 3,
            max_attack_damage: 7,
            percent_damage_bonus: 0,
            flat_damage_bonus: 1,
            armor_penetration: 0,
        },
        class: Some(PlayerClass::Rogue),
        kill_exp: 0,
    }
}

/// Spawn parameters for a shambling melee monster.
#[must_use]
pub fn zombie_params(x: i32, health: i32) -> ActorSpawnParams {
    ActorSpawnParams {
        kind: ActorKind::Monster,
        faction: Faction::Hell,
        position: vec2(x, 0),
        health,
        armor: 2,
        level: 2,
        kill_exp: 25,
        ..Default::default()
    }
}

/// A seeded session with one archer at the origin and one zombie six
/// tiles east. Returns the session plus both actor ids.
#[must_use]
pub fn duel_session(seed: u64) -> (Simulation, ActorId, ActorId) {
    let mut sim = Simulation::new(seed);
    let archer = sim.spawn_actor(archer_params());
    let zombie = sim.spawn_actor(zombie_params(6, 80));
    (sim, archer, zombie)
}
