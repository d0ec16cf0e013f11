//! Core simulation loop: the missile lifecycle driver.
//!
//! The simulation advances on a fixed tick and processes all combat
//! logic deterministically. Each tick, every live missile is stepped in
//! insertion order: movement first, then engagement against the first
//! qualifying actor overlap, then the TTL countdown. Completed missiles
//! are removed at the end of the tick and receive no further calls.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (fixed-point via [`Fixed`])
//! - One seeded random stream, consumed in a fixed order
//! - Missiles step in insertion order; actors scan in sorted-id order
//! - Same seed and same cast/tick sequence always produce the same
//!   hit/miss outcomes and damage values
//!
//! # Example
//!
//! ```
//! use arpg_core::actor::{ActorKind, ActorSpawnParams, Faction};
//! use arpg_core::attack::AttackId;
//! use arpg_core::host::NullHost;
//! use arpg_core::math::{Fixed, Vec2Fixed};
//! use arpg_core::player::PlayerClass;
//! use arpg_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(42);
//! let mut host = NullHost::default();
//!
//! let caster = sim.spawn_actor(ActorSpawnParams {
//!     kind: ActorKind::Player,
//!     faction: Faction::Heaven,
//!     class: Some(PlayerClass::Sorcerer),
//!     ..Default::default()
//! });
//!
//! let target = Vec2Fixed::new(Fixed::from_num(5), Fixed::ZERO);
//! let handle = sim.cast(AttackId::Firebolt, caster, target, &mut host).unwrap();
//!
//! sim.tick(&mut host);
//! assert!(!sim.is_complete(handle));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::actor::{Actor, ActorId, ActorSpawnParams, ActorStorage, Faction};
use crate::attack::{AttackId, Creation, Engagement, Movement};
use crate::combat::{self, ActorStatsSnapshot};
use crate::error::{EngineError, Result};
use crate::host::Host;
use crate::math::{Direction16, Fixed, Vec2Fixed};
use crate::missile::{Missile, MissileGraphic, MissileHandle};
use crate::player;
use crate::rng::GameRng;

/// Ticks per second for the simulation.
pub const TICK_RATE: u32 = 20;

/// A damage application from a missile engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    /// The missile's creator.
    pub attacker: ActorId,
    /// The actor that was hit.
    pub target: ActorId,
    /// The attack kind that connected.
    pub attack_id: AttackId,
    /// Damage actually dealt.
    pub damage: i32,
}

/// An actor stepping through a town portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalTransit {
    /// The actor transiting.
    pub actor: ActorId,
    /// The anchor point the portal was placed at.
    pub anchor: Vec2Fixed,
}

/// Events generated during a simulation tick.
///
/// Consumed by the game layer to trigger effects the core does not
/// implement (floating damage text, death animations, level transitions).
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// Damage applications from missile engagements.
    pub damage_events: Vec<DamageEvent>,
    /// Actors that died this tick.
    pub deaths: Vec<ActorId>,
    /// Portal transits triggered this tick.
    pub portal_transits: Vec<PortalTransit>,
    /// Missiles retired at the end of this tick.
    pub completed: Vec<MissileHandle>,
}

/// A kill recorded mid-tick, resolved into experience after the missile
/// pass (the victim's stats are captured here because the victim is
/// removed before experience is awarded).
#[derive(Debug, Clone, Copy)]
struct KillRecord {
    killer: ActorId,
    victim: ActorId,
    victim_level: i32,
    kill_exp: i32,
    victim_is_monster: bool,
}

/// The core combat simulation.
///
/// Owns all actor and missile state plus the shared random stream, and
/// advances them deterministically one tick at a time.
///
/// # Tick order
///
/// 1. **Missiles** - movement, engagement, TTL, in insertion order
/// 2. **Experience** - kills from this tick are turned into experience
/// 3. **Deaths** - dead actors are removed
/// 4. **Retirement** - completed missiles are removed
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) tick: u64,
    pub(crate) actors: ActorStorage,
    /// Live missiles in insertion order. The order is part of the
    /// determinism contract: engagements mutate shared actor state and
    /// consume the shared stream.
    pub(crate) missiles: Vec<Missile>,
    pub(crate) next_missile_handle: u32,
    pub(crate) rng: GameRng,
}

impl Simulation {
    /// Create a new simulation seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            tick: 0,
            actors: ActorStorage::new(),
            missiles: Vec::new(),
            next_missile_handle: 1,
            rng: GameRng::from_seed(seed),
        }
    }

    /// Get the current tick number.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Get a reference to the actor storage.
    #[must_use]
    pub fn actors(&self) -> &ActorStorage {
        &self.actors
    }

    /// Get an actor by ID.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Get a mutable reference to an actor by ID.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    /// Spawn a new actor and return its ID.
    pub fn spawn_actor(&mut self, params: ActorSpawnParams) -> ActorId {
        self.actors.insert(params)
    }

    /// Remove an actor from the simulation.
    ///
    /// Missiles it created stay in flight; their engagement strategies
    /// skip creator-relative effects from then on.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ActorNotFound`] if the actor doesn't exist.
    pub fn despawn_actor(&mut self, id: ActorId) -> Result<()> {
        if self.actors.remove(id).is_some() {
            Ok(())
        } else {
            Err(EngineError::ActorNotFound(id))
        }
    }

    /// Number of live (not yet retired) missiles.
    #[must_use]
    pub fn live_missile_count(&self) -> usize {
        self.missiles.len()
    }

    /// Get a live missile by handle.
    #[must_use]
    pub fn missile(&self, handle: MissileHandle) -> Option<&Missile> {
        self.missiles.iter().find(|m| m.handle == handle)
    }

    /// Whether the missile behind `handle` has finished.
    ///
    /// Retired missiles are removed from the live set, so an unknown
    /// handle reports complete.
    #[must_use]
    pub fn is_complete(&self, handle: MissileHandle) -> bool {
        self.missile(handle).map_or(true, Missile::is_complete)
    }

    /// Cast a ranged attack and register the resulting missile.
    ///
    /// Captures the caster's combat-relevant stats at this instant; later
    /// stat changes on the caster never affect the missile in flight.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ActorNotFound`] if the caster doesn't
    /// exist.
    pub fn cast(
        &mut self,
        attack_id: AttackId,
        creator: ActorId,
        target: Vec2Fixed,
        host: &mut dyn Host,
    ) -> Result<MissileHandle> {
        let caster = self
            .actors
            .get(creator)
            .ok_or(EngineError::ActorNotFound(creator))?;
        let snapshot = ActorStatsSnapshot::capture(caster);
        let src_point = caster.position();

        let handle = MissileHandle(self.next_missile_handle);
        self.next_missile_handle += 1;

        let mut missile = Missile::new(handle, attack_id, creator, src_point, snapshot);
        run_creation(&mut missile, target, host);

        if let Some(effect) = attack_id.cast_sound() {
            host.request_sound(effect);
        }

        tracing::debug!(
            attack = attack_id.display_name(),
            creator,
            handle = handle.0,
            "missile cast"
        );

        self.missiles.push(missile);
        Ok(handle)
    }

    /// Advance the simulation by one tick.
    ///
    /// Steps every live missile in insertion order, resolves kills into
    /// experience, removes the dead, retires completed missiles, and
    /// increments the tick counter.
    pub fn tick(&mut self, host: &mut dyn Host) -> TickEvents {
        let mut events = TickEvents::default();
        let mut kills: Vec<KillRecord> = Vec::new();

        // Sorted actor IDs for deterministic collision scans.
        let actor_ids = self.actors.sorted_ids();

        // 1. Missile system.
        for missile in &mut self.missiles {
            if missile.is_complete() {
                continue;
            }
            step_movement(missile, &self.actors);
            resolve_engagements(
                missile,
                &actor_ids,
                &mut self.actors,
                &mut self.rng,
                host,
                &mut events,
                &mut kills,
            );
            // TTL expiry and engagement outcome are independent
            // completion triggers.
            missile.tick_ttl();
        }

        // 2. Experience for kills. The victim's stats were captured at
        // kill time; the killer must still exist and be a player.
        for kill in &kills {
            if !kill.victim_is_monster {
                continue;
            }
            if let Some(killer) = self.actors.get_mut(kill.killer) {
                if killer.is_player() {
                    tracing::debug!(
                        killer = kill.killer,
                        victim = kill.victim,
                        "monster killed"
                    );
                    player::award_experience(killer, kill.kill_exp, kill.victim_level);
                }
            }
        }

        // 3. Remove dead actors.
        for &id in &actor_ids {
            if let Some(actor) = self.actors.get(id) {
                if !actor.is_alive() {
                    events.deaths.push(id);
                }
            }
        }
        for id in &events.deaths {
            self.actors.remove(*id);
        }

        // 4. Retire completed missiles at the end of the tick, giving
        // their visual handles back to the host.
        for missile in self.missiles.iter().filter(|m| m.is_complete()) {
            events.completed.push(missile.handle);
            for graphic in &missile.graphics {
                host.release_visual(graphic.handle);
            }
        }
        self.missiles.retain(|m| !m.is_complete());

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "simulation state hash");
        }

        events
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two identically-driven sessions produce identical hashes; used
    /// for desync detection and determinism tests.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.rng.draw_count().hash(&mut hasher);

        let ids = self.actors.sorted_ids();
        ids.len().hash(&mut hasher);
        for id in ids {
            if let Some(actor) = self.actors.get(id) {
                id.hash(&mut hasher);
                actor.position.x.to_bits().hash(&mut hasher);
                actor.position.y.to_bits().hash(&mut hasher);
                actor.health.current.hash(&mut hasher);
                actor.health.max.hash(&mut hasher);
                actor.mana.current.hash(&mut hasher);
                actor.mana.max.hash(&mut hasher);
                actor.level.hash(&mut hasher);
                if let Some(progress) = actor.player {
                    progress.exp.hash(&mut hasher);
                }
            }
        }

        self.missiles.len().hash(&mut hasher);
        for missile in &self.missiles {
            missile.handle.0.hash(&mut hasher);
            missile.attack_id.hash(&mut hasher);
            missile.creator.hash(&mut hasher);
            missile.ttl_remaining().hash(&mut hasher);
            missile.distance_travelled().to_bits().hash(&mut hasher);
            missile.is_complete().hash(&mut hasher);
            for graphic in &missile.graphics {
                graphic.position.x.to_bits().hash(&mut hasher);
                graphic.position.y.to_bits().hash(&mut hasher);
                graphic.frame.hash(&mut hasher);
            }
        }

        hasher.finish()
    }
}

/// Run a missile's creation strategy: compute direction, attach visuals.
fn run_creation(missile: &mut Missile, target: Vec2Fixed, host: &mut dyn Host) {
    let id = missile.attack_id;
    let frames = id.frame_count();

    let aim = target - missile.src_point;
    let facing = Direction16::from_vector(aim);
    missile.direction = aim.normalize();
    if missile.direction == Vec2Fixed::ZERO {
        // Cast at the caster's own tile: fall back to the facing axis.
        missile.direction = facing.unit_vector();
    }

    match missile.attr.creation {
        Creation::SingleFrame16Direction => {
            let key = format!("{}/{}", id.visual_key(), facing.index());
            let handle = host.load_visual(&key);
            missile.graphics.push(MissileGraphic::new(
                handle,
                missile.src_point,
                facing,
                frames,
                false,
            ));
        }
        Creation::Animated16Direction => {
            let key = format!("{}/{}", id.visual_key(), facing.index());
            let handle = host.load_visual(&key);
            missile.graphics.push(MissileGraphic::new(
                handle,
                missile.src_point,
                facing,
                frames,
                true,
            ));
        }
        Creation::Firewall => {
            // A row of flames perpendicular to the cast direction,
            // centered on the target point.
            let perp = Vec2Fixed::new(-missile.direction.y, missile.direction.x);
            for offset in -2i32..=2 {
                let position = target + perp.scaled(Fixed::from_num(offset));
                let handle = host.load_visual(id.visual_key());
                missile
                    .graphics
                    .push(MissileGraphic::new(handle, position, facing, frames, true));
            }
        }
        Creation::BasicAnimated => {
            let handle = host.load_visual(id.visual_key());
            missile.graphics.push(MissileGraphic::new(
                handle,
                missile.src_point,
                facing,
                frames,
                true,
            ));
        }
        Creation::TownPortal => {
            let handle = host.load_visual(id.visual_key());
            missile
                .graphics
                .push(MissileGraphic::new(handle, target, facing, frames, true));
        }
    }
}

/// Run a missile's movement strategy and advance animation frames.
fn step_movement(missile: &mut Missile, actors: &ActorStorage) {
    match missile.attr.movement {
        Movement::Stationary => {}
        Movement::Linear { speed, max_range } => {
            let delta = missile.direction.scaled(speed);
            for graphic in &mut missile.graphics {
                graphic.position = graphic.position + delta;
            }
            missile.travel(speed, max_range);
        }
        Movement::HoverOverCreator => {
            // Creator gone: keep the last position, complete on TTL.
            if let Some(creator) = actors.get(missile.creator) {
                let position = creator.position();
                for graphic in &mut missile.graphics {
                    graphic.position = position;
                }
            }
        }
    }

    for graphic in &mut missile.graphics {
        graphic.advance_frame();
    }
}

/// Scan for collision candidates and run the engagement strategy on the
/// first qualifying overlap per graphic.
fn resolve_engagements(
    missile: &mut Missile,
    actor_ids: &[ActorId],
    actors: &mut ActorStorage,
    rng: &mut GameRng,
    host: &mut dyn Host,
    events: &mut TickEvents,
    kills: &mut Vec<KillRecord>,
) {
    match missile.attr.engagement {
        Engagement::None => {}
        Engagement::TownPortal => {
            // The portal engages only the actor it was opened for.
            let Some(creator) = actors.get(missile.creator) else {
                return;
            };
            if !creator.is_alive() {
                return;
            }
            let anchor = missile
                .graphics
                .iter()
                .map(|graphic| graphic.position)
                .find(|&position| creator.is_near(position));
            if let Some(anchor) = anchor {
                events.portal_transits.push(PortalTransit {
                    actor: missile.creator,
                    anchor,
                });
                if let Some(effect) = missile.attack_id.impact_sound() {
                    host.request_sound(effect);
                }
                tracing::debug!(actor = missile.creator, "portal transit");
                missile.mark_complete();
            }
        }
        Engagement::DamageEnemy { .. } | Engagement::DamageEnemyAndStop | Engagement::Arrow => {
            // Hostility is defined relative to the creator; with the
            // creator gone the missile flies inert until TTL/range.
            let Some(creator_faction) = actors.get(missile.creator).map(|a| a.faction) else {
                return;
            };

            for graphic_index in 0..missile.graphics.len() {
                let position = missile.graphics[graphic_index].position;
                let Some(target_id) =
                    first_qualifying_overlap(missile.creator, creator_faction, position, actor_ids, actors)
                else {
                    continue;
                };
                engage_target(missile, target_id, actors, rng, host, events, kills);
                if missile.is_complete() {
                    return;
                }
            }
        }
    }
}

/// Find the first live enemy of the creator overlapping `position`, in
/// sorted actor-id order.
fn first_qualifying_overlap(
    creator: ActorId,
    creator_faction: Faction,
    position: Vec2Fixed,
    actor_ids: &[ActorId],
    actors: &ActorStorage,
) -> Option<ActorId> {
    for &id in actor_ids {
        if id == creator {
            continue;
        }
        let Some(actor) = actors.get(id) else {
            continue;
        };
        if !actor.is_alive() {
            continue;
        }
        if !actor.faction.is_enemy_of(creator_faction) {
            continue;
        }
        if actor.is_near(position) {
            return Some(id);
        }
    }
    None
}

/// Apply a damaging engagement strategy to one target.
fn engage_target(
    missile: &mut Missile,
    target_id: ActorId,
    actors: &mut ActorStorage,
    rng: &mut GameRng,
    host: &mut dyn Host,
    events: &mut TickEvents,
    kills: &mut Vec<KillRecord>,
) {
    let Some(target) = actors.get_mut(target_id) else {
        return;
    };

    let damage = match missile.attr.engagement {
        Engagement::DamageEnemy { damage } => damage,
        Engagement::DamageEnemyAndStop => {
            let damage = missile.snapshot.roll_ranged_damage(rng);
            missile.mark_complete();
            damage
        }
        Engagement::Arrow => {
            let chance = missile.snapshot.ranged_to_hit_chance(target.armor());
            if !combat::check_hit(rng, chance) {
                // Miss: the arrow flies past and keeps its budget.
                tracing::trace!(
                    handle = missile.handle.0,
                    target = target_id,
                    chance,
                    "ranged attack missed"
                );
                return;
            }
            let damage = missile.snapshot.roll_ranged_damage(rng);
            missile.mark_complete();
            damage
        }
        Engagement::None | Engagement::TownPortal => return,
    };

    let dealt = target.apply_damage(damage);
    events.damage_events.push(DamageEvent {
        attacker: missile.creator,
        target: target_id,
        attack_id: missile.attack_id,
        damage: dealt,
    });
    tracing::trace!(
        handle = missile.handle.0,
        target = target_id,
        damage = dealt,
        "ranged attack hit"
    );

    if missile.is_complete() {
        if let Some(effect) = missile.attack_id.impact_sound() {
            host.request_sound(effect);
        }
    }

    if !target.is_alive() {
        kills.push(KillRecord {
            killer: missile.creator,
            victim: target_id,
            victim_level: target.level(),
            kill_exp: target.monster.map_or(0, |m| m.kill_exp),
            victim_is_monster: target.is_monster(),
        });
    }
}
