//! Session persistence.
//!
//! Saves are versioned binary blobs: tick counter, RNG stream state,
//! the actor store, and one record per live missile. Strategies are
//! never serialized (a restored missile re-binds to the [`Attributes`]
//! of its attack id through the registry); only the data they operate on
//! is written: identity, creator index, source point, the captured
//! combat snapshot, remaining TTL, travelled distance, and per-graphic
//! visual state.
//!
//! A corrupt or version-mismatched payload is a fatal condition for the
//! caller: an inconsistent restore would desynchronize every subsequent
//! tick.

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, ActorStorage};
use crate::attack::{AttackId, Attributes, Tick};
use crate::combat::ActorStatsSnapshot;
use crate::error::{EngineError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::missile::{Missile, MissileGraphic, MissileHandle};
use crate::rng::GameRng;
use crate::simulation::Simulation;

/// Save format version for compatibility checks.
pub const SAVE_VERSION: u32 = 1;

/// Persisted state of one live missile.
///
/// Everything a missile needs to resume exactly, except behavior,
/// which is re-bound from the registry on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMissile {
    /// Handle the missile was registered under.
    pub handle: MissileHandle,
    /// Attack kind; the registry key for re-binding.
    pub attack_id: AttackId,
    /// Creator actor index. Resolvable against the saved actor store,
    /// or dangling if the creator died before the save.
    pub creator: ActorId,
    /// Cast-time position of the creator.
    pub src_point: Vec2Fixed,
    /// Combat snapshot captured at cast time.
    pub snapshot: ActorStatsSnapshot,
    /// Unit cast direction.
    pub direction: Vec2Fixed,
    /// Remaining time-to-live counter.
    pub ttl_remaining: Tick,
    /// Cumulative travelled distance.
    #[serde(with = "fixed_serde")]
    pub distance_travelled: Fixed,
    /// Visual state, in creation order: handle, position, facing and
    /// animation frame per owned visual.
    pub graphics: Vec<MissileGraphic>,
}

impl SavedMissile {
    /// Capture the persistent state of a live missile.
    #[must_use]
    pub fn from_missile(missile: &Missile) -> Self {
        Self {
            handle: missile.handle,
            attack_id: missile.attack_id,
            creator: missile.creator,
            src_point: missile.src_point,
            snapshot: missile.snapshot,
            direction: missile.direction,
            ttl_remaining: missile.ttl_remaining(),
            distance_travelled: missile.distance_travelled(),
            graphics: missile.graphics.clone(),
        }
    }

    /// Rebuild a live missile, re-binding behavior via
    /// [`Attributes::for_id`].
    #[must_use]
    pub fn into_missile(self) -> Missile {
        let mut missile = Missile::new(
            self.handle,
            self.attack_id,
            self.creator,
            self.src_point,
            self.snapshot,
        );
        debug_assert_eq!(missile.attr, Attributes::for_id(self.attack_id));
        missile.graphics = self.graphics;
        missile.restore_lifecycle(self.ttl_remaining, self.distance_travelled, self.direction);
        missile
    }
}

/// Complete persisted session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSession {
    /// Save format version.
    pub version: u32,
    /// Simulation tick counter.
    pub tick: u64,
    /// Next missile handle to assign.
    pub next_missile_handle: u32,
    /// RNG stream state, mid-sequence.
    pub rng: GameRng,
    /// All actors.
    pub actors: ActorStorage,
    /// One record per live missile, in insertion order.
    pub missiles: Vec<SavedMissile>,
}

impl Simulation {
    /// Serialize the session for persistence.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SaveData`] if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let session = SavedSession {
            version: SAVE_VERSION,
            tick: self.tick,
            next_missile_handle: self.next_missile_handle,
            rng: self.rng.clone(),
            actors: self.actors.clone(),
            missiles: self.missiles.iter().map(SavedMissile::from_missile).collect(),
        };
        bincode::serialize(&session)
            .map_err(|e| EngineError::SaveData(format!("failed to encode session: {e}")))
    }

    /// Restore a session from persisted bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SaveData`] on a malformed payload, or
    /// [`EngineError::SaveVersionMismatch`] for a payload written by an
    /// incompatible build. Both are fatal for the caller.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let session: SavedSession = bincode::deserialize(data)
            .map_err(|e| EngineError::SaveData(format!("failed to decode session: {e}")))?;

        if session.version != SAVE_VERSION {
            return Err(EngineError::SaveVersionMismatch {
                expected: SAVE_VERSION,
                actual: session.version,
            });
        }

        let missiles = session
            .missiles
            .into_iter()
            .map(SavedMissile::into_missile)
            .collect();

        Ok(Self {
            tick: session.tick,
            actors: session.actors,
            missiles,
            next_missile_handle: session.next_missile_handle,
            rng: session.rng,
        })
    }
}
