//! Live missile state.
//!
//! A [`Missile`] is one in-flight instance of a ranged effect: the
//! attack kind it was created from, a non-owning reference to its
//! creator, the combat snapshot captured at cast time, and the visuals
//! it owns. Behavior lives in the [`Attributes`] triple re-bound from
//! the registry; the missile itself is data.

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::attack::{AttackId, Attributes, Tick};
use crate::combat::ActorStatsSnapshot;
use crate::host::VisualHandle;
use crate::math::{Direction16, Fixed, Vec2Fixed};

/// Handle identifying a cast missile.
///
/// Handles stay valid after the missile completes; a completed (and
/// removed) missile simply reports complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissileHandle(pub u32);

/// One visual owned by a missile.
///
/// The handle is opaque; this core only tracks position, facing and the
/// animation frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissileGraphic {
    /// Opaque handle from the host's visual loader.
    pub handle: VisualHandle,
    /// World position of this visual.
    pub position: Vec2Fixed,
    /// Compass facing used to pick the directional variant.
    pub facing: Direction16,
    /// Current animation frame.
    pub frame: u32,
    /// Total frames in the animation.
    pub frame_count: u32,
    /// Whether the frame counter advances each tick.
    pub animated: bool,
}

impl MissileGraphic {
    /// Create a graphic at a position.
    #[must_use]
    pub const fn new(
        handle: VisualHandle,
        position: Vec2Fixed,
        facing: Direction16,
        frame_count: u32,
        animated: bool,
    ) -> Self {
        Self {
            handle,
            position,
            facing,
            frame: 0,
            frame_count,
            animated,
        }
    }

    /// Advance the animation by one frame, wrapping at the end.
    pub fn advance_frame(&mut self) {
        if self.animated && self.frame_count > 0 {
            self.frame = (self.frame + 1) % self.frame_count;
        }
    }
}

/// One live ranged effect.
#[derive(Debug, Clone)]
pub struct Missile {
    /// Handle this missile was registered under.
    pub handle: MissileHandle,
    /// The attack kind this missile was created from.
    pub attack_id: AttackId,
    /// Non-owning reference to the casting actor. May dangle if the
    /// actor is later removed; creator-relative effects are then skipped.
    pub creator: ActorId,
    /// Cast-time position of the creator.
    pub src_point: Vec2Fixed,
    /// Combat stats frozen at cast time. Later stat changes on the
    /// caster never affect this missile.
    pub snapshot: ActorStatsSnapshot,
    /// Unit vector of the cast direction.
    pub direction: Vec2Fixed,
    /// Owned visuals, in creation order.
    pub graphics: Vec<MissileGraphic>,
    /// Behavior triple re-bound from the registry; never serialized.
    pub attr: Attributes,
    ttl_remaining: Tick,
    distance_travelled: Fixed,
    complete: bool,
}

impl Missile {
    /// Create a new missile bound to the attributes of its attack kind.
    ///
    /// The creation strategy has not run yet; graphics are attached by
    /// the lifecycle driver at cast time.
    #[must_use]
    pub fn new(
        handle: MissileHandle,
        attack_id: AttackId,
        creator: ActorId,
        src_point: Vec2Fixed,
        snapshot: ActorStatsSnapshot,
    ) -> Self {
        let attr = Attributes::for_id(attack_id);
        Self {
            handle,
            attack_id,
            creator,
            src_point,
            snapshot,
            direction: Vec2Fixed::ZERO,
            graphics: Vec::new(),
            attr,
            ttl_remaining: attr.time_to_live,
            distance_travelled: Fixed::ZERO,
            complete: false,
        }
    }

    /// Whether this missile has finished. Terminal: once set it never
    /// clears.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Mark the missile finished. Idempotent.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    /// Ticks left before forced completion.
    #[must_use]
    pub const fn ttl_remaining(&self) -> Tick {
        self.ttl_remaining
    }

    /// Cumulative distance travelled, in world units.
    #[must_use]
    pub const fn distance_travelled(&self) -> Fixed {
        self.distance_travelled
    }

    /// Count down the time-to-live; completes the missile when it
    /// reaches zero, regardless of engagement outcome.
    pub fn tick_ttl(&mut self) {
        if self.ttl_remaining > 0 {
            self.ttl_remaining -= 1;
        }
        if self.ttl_remaining == 0 {
            self.mark_complete();
        }
    }

    /// Add travelled distance; completes the missile once the total
    /// reaches `max_range`.
    pub fn travel(&mut self, step: Fixed, max_range: Fixed) {
        self.distance_travelled += step;
        if self.distance_travelled >= max_range {
            self.mark_complete();
        }
    }

    /// Restore persisted lifecycle state after a load.
    pub(crate) fn restore_lifecycle(
        &mut self,
        ttl_remaining: Tick,
        distance_travelled: Fixed,
        direction: Vec2Fixed,
    ) {
        self.ttl_remaining = ttl_remaining;
        self.distance_travelled = distance_travelled;
        self.direction = direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{TO_HIT_MAX, TO_HIT_MIN};

    fn dummy_snapshot() -> ActorStatsSnapshot {
        ActorStatsSnapshot {
            to_hit_base: 60,
            to_hit_min: TO_HIT_MIN,
            to_hit_max: TO_HIT_MAX,
            damage: 3,
            damage_bonus_min: 1,
            damage_bonus_max: 4,
        }
    }

    fn dummy_missile(id: AttackId) -> Missile {
        Missile::new(MissileHandle(1), id, 1, Vec2Fixed::ZERO, dummy_snapshot())
    }

    #[test]
    fn test_new_missile_binds_registry_attributes() {
        let missile = dummy_missile(AttackId::Firewall);
        assert_eq!(missile.attr, Attributes::for_id(AttackId::Firewall));
        assert_eq!(missile.ttl_remaining(), missile.attr.time_to_live);
        assert!(!missile.is_complete());
    }

    #[test]
    fn test_ttl_countdown_forces_completion() {
        let mut missile = dummy_missile(AttackId::ManaShield);
        let ttl = missile.ttl_remaining();

        for _ in 0..ttl - 1 {
            missile.tick_ttl();
            assert!(!missile.is_complete());
        }
        missile.tick_ttl();
        assert!(missile.is_complete());
    }

    #[test]
    fn test_completion_is_terminal() {
        let mut missile = dummy_missile(AttackId::Arrow);
        missile.mark_complete();
        missile.mark_complete();
        assert!(missile.is_complete());
    }

    #[test]
    fn test_travel_completes_at_max_range() {
        let mut missile = dummy_missile(AttackId::Arrow);
        let step = Fixed::from_num(0.5);
        let range = Fixed::from_num(2);

        missile.travel(step, range); // 0.5
        missile.travel(step, range); // 1.0
        missile.travel(step, range); // 1.5
        assert!(!missile.is_complete());
        missile.travel(step, range); // 2.0, first tick at or past range
        assert!(missile.is_complete());
    }

    #[test]
    fn test_frame_advance_wraps() {
        let mut graphic = MissileGraphic::new(
            VisualHandle(0),
            Vec2Fixed::ZERO,
            Direction16::from_index(0),
            3,
            true,
        );
        graphic.advance_frame();
        graphic.advance_frame();
        assert_eq!(graphic.frame, 2);
        graphic.advance_frame();
        assert_eq!(graphic.frame, 0);
    }

    #[test]
    fn test_static_frame_never_advances() {
        let mut graphic = MissileGraphic::new(
            VisualHandle(0),
            Vec2Fixed::ZERO,
            Direction16::from_index(5),
            1,
            false,
        );
        graphic.advance_frame();
        assert_eq!(graphic.frame, 0);
    }
}
