//! Actor state and storage.
//!
//! Actors are the mutable participants of the simulation: players and
//! monsters. This core reads a small, stable surface from them (position,
//! armor, level, hostility) and mutates health through engagement
//! strategies. Richer stat derivation (inventory, equipment) lives in a
//! separately-evolving system; its output arrives here as a pre-computed
//! [`GearBonus`] block the core never recomputes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Vec2Fixed};
use crate::player::{PlayerClass, PlayerProgress};

/// Unique identifier for actors. Stable across save/restore, which is
/// what lets a saved missile re-find its creator.
pub type ActorId = u32;

/// Overlap threshold for missile/actor contact, in world units.
const NEAR_DISTANCE: i64 = 1;

/// Allegiance used for hostility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Players and town allies.
    Heaven,
    /// Monsters.
    Hell,
}

impl Faction {
    /// Whether members of this faction treat members of `other` as
    /// enemies.
    #[must_use]
    pub const fn is_enemy_of(self, other: Self) -> bool {
        !matches!(
            (self, other),
            (Faction::Heaven, Faction::Heaven) | (Faction::Hell, Faction::Hell)
        )
    }
}

/// Explicit actor-kind tag.
///
/// Code that needs to know "is this a monster" asks this tag through
/// [`Actor::is_monster`] instead of inspecting concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// A player character.
    Player,
    /// A hostile monster.
    Monster,
}

/// A current/maximum resource pool (health, mana).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vital {
    /// Current value.
    pub current: i32,
    /// Maximum value.
    pub max: i32,
}

impl Vital {
    /// Create a pool at full value.
    #[must_use]
    pub const fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Check if the pool is empty.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    /// Apply damage, returning the amount actually removed.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.current);
        self.current -= actual;
        actual
    }

    /// Raise the maximum without touching the current value.
    pub fn raise_max(&mut self, amount: i32) {
        self.max = self.max.saturating_add(amount);
    }

    /// Refill to maximum.
    pub fn restore_full(&mut self) {
        self.current = self.max;
    }
}

/// Aggregate equipment bonuses, computed by the inventory system.
///
/// The core treats this as opaque input: it is read by snapshot capture
/// and the damage formulas, never derived here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearBonus {
    /// Minimum weapon damage.
    pub min_attack_damage: i32,
    /// Maximum weapon damage.
    pub max_attack_damage: i32,
    /// Percentage damage bonus (e.g. 20 = +20%).
    pub percent_damage_bonus: i32,
    /// Flat damage bonus added after scaling.
    pub flat_damage_bonus: i32,
    /// Armor penetration added to to-hit chance.
    pub armor_penetration: i32,
}

impl Default for GearBonus {
    fn default() -> Self {
        // Bare fists.
        Self {
            min_attack_damage: 1,
            max_attack_damage: 4,
            percent_damage_bonus: 0,
            flat_damage_bonus: 0,
            armor_penetration: 0,
        }
    }
}

/// Monster-only data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterInfo {
    /// Base experience granted to the killer.
    pub kill_exp: i32,
}

/// One live actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier.
    pub id: ActorId,
    /// Player or monster.
    pub kind: ActorKind,
    /// Allegiance for hostility checks.
    pub faction: Faction,
    /// World position.
    pub position: Vec2Fixed,
    /// Health pool.
    pub health: Vital,
    /// Mana pool.
    pub mana: Vital,
    /// Armor rating, read live at time of impact.
    pub armor: i32,
    /// Character/monster level.
    pub level: i32,
    /// Dexterity stat, feeds the to-hit base.
    pub dexterity: i32,
    /// Character base damage (strength-derived, supplied externally).
    pub base_damage: i32,
    /// Equipment bonus block from the inventory system.
    pub gear: GearBonus,
    /// Player-only progression data.
    pub player: Option<PlayerProgress>,
    /// Monster-only data.
    pub monster: Option<MonsterInfo>,
}

impl Actor {
    /// Current world position.
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Armor rating.
    #[must_use]
    pub const fn armor(&self) -> i32 {
        self.armor
    }

    /// Character/monster level.
    #[must_use]
    pub const fn level(&self) -> i32 {
        self.level
    }

    /// Whether this actor treats `other` as an enemy.
    #[must_use]
    pub const fn is_enemy(&self, other: &Actor) -> bool {
        self.faction.is_enemy_of(other.faction)
    }

    /// Whether this actor is within contact range of a point.
    #[must_use]
    pub fn is_near(&self, point: Vec2Fixed) -> bool {
        self.position.distance_squared(point) <= Fixed::from_num(NEAR_DISTANCE)
    }

    /// Apply damage to health, returning the amount actually dealt.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        self.health.apply_damage(amount)
    }

    /// Whether the actor still has health.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health.current > 0
    }

    /// Capability query: is this actor a monster?
    #[must_use]
    pub fn is_monster(&self) -> bool {
        self.kind == ActorKind::Monster
    }

    /// Capability query: is this actor a player?
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }
}

/// Parameters for spawning a new actor.
#[derive(Debug, Clone)]
pub struct ActorSpawnParams {
    /// Player or monster.
    pub kind: ActorKind,
    /// Allegiance.
    pub faction: Faction,
    /// Initial world position.
    pub position: Vec2Fixed,
    /// Maximum health (spawns at full).
    pub health: i32,
    /// Maximum mana (spawns at full).
    pub mana: i32,
    /// Armor rating.
    pub armor: i32,
    /// Starting level.
    pub level: i32,
    /// Dexterity stat.
    pub dexterity: i32,
    /// Character base damage.
    pub base_damage: i32,
    /// Equipment bonus block.
    pub gear: GearBonus,
    /// Player class; `Some` spawns a player progression record.
    pub class: Option<PlayerClass>,
    /// Kill experience; used when spawning monsters.
    pub kill_exp: i32,
}

impl Default for ActorSpawnParams {
    fn default() -> Self {
        Self {
            kind: ActorKind::Monster,
            faction: Faction::Hell,
            position: Vec2Fixed::ZERO,
            health: 10,
            mana: 0,
            armor: 0,
            level: 1,
            dexterity: 10,
            base_damage: 0,
            gear: GearBonus::default(),
            class: None,
            kill_exp: 10,
        }
    }
}

/// Storage for all actors in the simulation.
///
/// Uses a `HashMap` for O(1) lookup by ID, with deterministic iteration
/// via sorted keys when scanning for collision candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorStorage {
    actors: HashMap<ActorId, Actor>,
    next_id: ActorId,
}

impl ActorStorage {
    /// Create empty actor storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actors: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert an actor built from spawn parameters and return its ID.
    pub fn insert(&mut self, params: ActorSpawnParams) -> ActorId {
        let id = self.next_id;
        self.next_id += 1;

        let player = params
            .class
            .map(|class| PlayerProgress::new(class, params.level));
        let monster = match params.kind {
            ActorKind::Monster => Some(MonsterInfo {
                kill_exp: params.kill_exp,
            }),
            ActorKind::Player => None,
        };

        let actor = Actor {
            id,
            kind: params.kind,
            faction: params.faction,
            position: params.position,
            health: Vital::new(params.health),
            mana: Vital::new(params.mana),
            armor: params.armor,
            level: params.level,
            dexterity: params.dexterity,
            base_damage: params.base_damage,
            gear: params.gear,
            player,
            monster,
        };
        self.actors.insert(id, actor);
        id
    }

    /// Remove an actor by ID.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    /// Get an actor by ID.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Get a mutable reference to an actor by ID.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Check if an actor exists.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Get the number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Get sorted actor IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<_> = self.actors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all actors (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, &Actor)> {
        self.actors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_hostility() {
        assert!(Faction::Heaven.is_enemy_of(Faction::Hell));
        assert!(Faction::Hell.is_enemy_of(Faction::Heaven));
        assert!(!Faction::Heaven.is_enemy_of(Faction::Heaven));
        assert!(!Faction::Hell.is_enemy_of(Faction::Hell));
    }

    #[test]
    fn test_vital_damage_floors_at_zero() {
        let mut hp = Vital::new(10);
        assert_eq!(hp.apply_damage(4), 4);
        assert_eq!(hp.current, 6);
        assert_eq!(hp.apply_damage(100), 6);
        assert_eq!(hp.current, 0);
        assert!(hp.is_depleted());
    }

    #[test]
    fn test_vital_negative_damage_is_ignored() {
        let mut hp = Vital::new(10);
        assert_eq!(hp.apply_damage(-5), 0);
        assert_eq!(hp.current, 10);
    }

    #[test]
    fn test_storage_assigns_sequential_ids() {
        let mut storage = ActorStorage::new();
        let a = storage.insert(ActorSpawnParams::default());
        let b = storage.insert(ActorSpawnParams::default());
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(storage.sorted_ids(), vec![1, 2]);
    }

    #[test]
    fn test_spawn_player_gets_progress_record() {
        let mut storage = ActorStorage::new();
        let id = storage.insert(ActorSpawnParams {
            kind: ActorKind::Player,
            faction: Faction::Heaven,
            class: Some(PlayerClass::Rogue),
            ..Default::default()
        });

        let actor = storage.get(id).unwrap();
        assert!(actor.is_player());
        assert!(actor.player.is_some());
        assert!(actor.monster.is_none());
    }

    #[test]
    fn test_is_near_threshold() {
        let mut storage = ActorStorage::new();
        let id = storage.insert(ActorSpawnParams::default());
        let actor = storage.get(id).unwrap();

        assert!(actor.is_near(Vec2Fixed::new(Fixed::from_num(1), Fixed::ZERO)));
        assert!(!actor.is_near(Vec2Fixed::new(Fixed::from_num(2), Fixed::ZERO)));
    }
}
