//! Attack kinds and their behavior attributes.
//!
//! Every ranged/area effect in the game is identified by an [`AttackId`]
//! and driven by an [`Attributes`] triple: a creation strategy run once
//! at birth, a movement strategy run every tick, and an engagement
//! strategy run on actor contact, plus a time-to-live. Strategies are
//! discriminated unions carrying their own configuration, so one movement
//! algorithm serves many attack kinds with different tuning, and the
//! registry is a pure, total function over the closed enumeration:
//! there is no registration step and no failure mode.

use serde::{Deserialize, Serialize};

use crate::math::Fixed;

/// One discrete step of the simulation clock.
pub type Tick = u64;

/// Closed enumeration of ranged/area combat effects.
///
/// Used only as a lookup key; all behavior comes from
/// [`Attributes::for_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackId {
    /// Plain bow shot.
    Arrow,
    /// Fire-enchanted arrow.
    FireArrow,
    /// Lightning-enchanted arrow.
    LightningArrow,
    /// Bolt of fire that bursts on the first enemy hit.
    Firebolt,
    /// Stationary wall of flame.
    Firewall,
    /// Protective shield hovering over the caster.
    ManaShield,
    /// Teleport anchor back to town.
    TownPortal,
}

impl AttackId {
    /// Display name for logs and tooling.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Arrow => "Arrow",
            Self::FireArrow => "Fire Arrow",
            Self::LightningArrow => "Lightning Arrow",
            Self::Firebolt => "Firebolt",
            Self::Firewall => "Firewall",
            Self::ManaShield => "Mana Shield",
            Self::TownPortal => "Town Portal",
        }
    }

    /// Base key of the visual asset for this attack. Directional
    /// variants append `/<direction index>`.
    #[must_use]
    pub const fn visual_key(&self) -> &'static str {
        match self {
            Self::Arrow => "missiles/arrow",
            Self::FireArrow => "missiles/fire_arrow",
            Self::LightningArrow => "missiles/lightning_arrow",
            Self::Firebolt => "missiles/firebolt",
            Self::Firewall => "missiles/firewall",
            Self::ManaShield => "missiles/mana_shield",
            Self::TownPortal => "missiles/town_portal",
        }
    }

    /// Animation frame count for one visual of this attack.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        match self {
            Self::Arrow => 1,
            Self::FireArrow | Self::LightningArrow => 8,
            Self::Firebolt => 8,
            Self::Firewall => 13,
            Self::ManaShield => 12,
            Self::TownPortal => 18,
        }
    }

    /// Sound effect requested when the attack is cast.
    #[must_use]
    pub const fn cast_sound(&self) -> Option<&'static str> {
        match self {
            Self::Arrow | Self::FireArrow | Self::LightningArrow => Some("missiles/bow_loose"),
            Self::Firebolt => Some("missiles/firebolt_cast"),
            Self::Firewall => Some("missiles/firewall_ignite"),
            Self::ManaShield => Some("missiles/mana_shield_up"),
            Self::TownPortal => Some("missiles/portal_open"),
        }
    }

    /// Sound effect requested when the attack connects.
    #[must_use]
    pub const fn impact_sound(&self) -> Option<&'static str> {
        match self {
            Self::Arrow | Self::FireArrow | Self::LightningArrow => Some("missiles/arrow_impact"),
            Self::Firebolt => Some("missiles/firebolt_impact"),
            Self::Firewall | Self::ManaShield => None,
            Self::TownPortal => Some("missiles/portal_enter"),
        }
    }
}

/// Strategy run once at missile birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    /// One static visual, facing the compass direction nearest the
    /// source→target vector.
    SingleFrame16Direction,
    /// One animated visual with a per-direction variant.
    Animated16Direction,
    /// A row of stationary area-effect visuals perpendicular to the cast
    /// direction, centered on the target point.
    Firewall,
    /// One animated visual at the source, no direction.
    BasicAnimated,
    /// A stationary teleport anchor at the target point.
    TownPortal,
}

/// Strategy run once per tick for every live missile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// No position change; static area effects.
    Stationary,
    /// Advance along the fixed cast direction by `speed` per tick;
    /// complete once cumulative distance reaches `max_range`.
    Linear {
        /// Distance travelled per tick, in world units.
        speed: Fixed,
        /// Total travel budget, in world units.
        max_range: Fixed,
    },
    /// Track the creator's current position each tick.
    HoverOverCreator,
}

/// Strategy run when a missile's position overlaps a candidate actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    /// No effect on contact (non-damaging visuals).
    None,
    /// Apply a pre-specified flat amount; the missile keeps going, so
    /// area effects can hit many targets over their lifetime.
    DamageEnemy {
        /// Damage applied per contact.
        damage: i32,
    },
    /// Apply the captured snapshot damage, then complete (single-target
    /// projectile consumed on hit).
    DamageEnemyAndStop,
    /// To-hit roll from the captured snapshot against the target's live
    /// armor; damage and complete on success, fly on past on a miss.
    Arrow,
    /// Carry the creator through the portal, then complete.
    TownPortal,
}

/// The immutable behavior triple (plus TTL) bound to an [`AttackId`].
///
/// Attributes never change after lookup and are never serialized; a
/// restored missile re-binds through [`Attributes::for_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attributes {
    /// Strategy run once at missile birth.
    pub creation: Creation,
    /// Strategy run every tick.
    pub movement: Movement,
    /// Strategy run on actor contact.
    pub engagement: Engagement,
    /// Tick count after which the missile is forcibly completed,
    /// regardless of engagement outcome.
    pub time_to_live: Tick,
}

impl Attributes {
    /// The behavior registry: look up the attribute triple for an attack
    /// kind.
    ///
    /// Pure and total over the closed enumeration.
    #[must_use]
    pub fn for_id(id: AttackId) -> Self {
        match id {
            AttackId::Arrow => Self {
                creation: Creation::SingleFrame16Direction,
                movement: Movement::Linear {
                    speed: Fixed::from_num(0.5),
                    max_range: Fixed::from_num(15),
                },
                engagement: Engagement::Arrow,
                time_to_live: 500,
            },
            AttackId::FireArrow => Self {
                creation: Creation::Animated16Direction,
                movement: Movement::Linear {
                    speed: Fixed::from_num(0.5),
                    max_range: Fixed::from_num(15),
                },
                engagement: Engagement::Arrow,
                time_to_live: 500,
            },
            AttackId::LightningArrow => Self {
                creation: Creation::Animated16Direction,
                movement: Movement::Linear {
                    speed: Fixed::from_num(0.5),
                    max_range: Fixed::from_num(15),
                },
                engagement: Engagement::Arrow,
                time_to_live: 500,
            },
            AttackId::Firebolt => Self {
                creation: Creation::Animated16Direction,
                movement: Movement::Linear {
                    speed: Fixed::from_num(0.4),
                    max_range: Fixed::from_num(12),
                },
                engagement: Engagement::DamageEnemyAndStop,
                time_to_live: 500,
            },
            AttackId::Firewall => Self {
                creation: Creation::Firewall,
                movement: Movement::Stationary,
                engagement: Engagement::DamageEnemy { damage: 4 },
                time_to_live: 160,
            },
            AttackId::ManaShield => Self {
                creation: Creation::BasicAnimated,
                movement: Movement::HoverOverCreator,
                engagement: Engagement::None,
                time_to_live: 120,
            },
            AttackId::TownPortal => Self {
                creation: Creation::TownPortal,
                movement: Movement::Stationary,
                engagement: Engagement::TownPortal,
                time_to_live: 7200,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_IDS: [AttackId; 7] = [
        AttackId::Arrow,
        AttackId::FireArrow,
        AttackId::LightningArrow,
        AttackId::Firebolt,
        AttackId::Firewall,
        AttackId::ManaShield,
        AttackId::TownPortal,
    ];

    #[test]
    fn test_registry_is_total_and_sane() {
        for id in ALL_IDS {
            let attr = Attributes::for_id(id);
            assert!(attr.time_to_live > 0, "{} has no lifetime", id.display_name());
            assert!(id.frame_count() > 0);
            assert!(!id.visual_key().is_empty());
        }
    }

    #[test]
    fn test_registry_lookups_are_identical() {
        // All missiles of the same kind share the same configuration.
        for id in ALL_IDS {
            assert_eq!(Attributes::for_id(id), Attributes::for_id(id));
        }
    }

    #[test]
    fn test_arrow_attributes() {
        let attr = Attributes::for_id(AttackId::Arrow);
        assert_eq!(attr.creation, Creation::SingleFrame16Direction);
        assert_eq!(attr.engagement, Engagement::Arrow);
        assert!(matches!(attr.movement, Movement::Linear { .. }));
    }

    #[test]
    fn test_firewall_is_stationary_area_damage() {
        let attr = Attributes::for_id(AttackId::Firewall);
        assert_eq!(attr.movement, Movement::Stationary);
        assert!(matches!(attr.engagement, Engagement::DamageEnemy { damage } if damage > 0));
    }

    #[test]
    fn test_mana_shield_is_harmless_and_tracks_caster() {
        let attr = Attributes::for_id(AttackId::ManaShield);
        assert_eq!(attr.movement, Movement::HoverOverCreator);
        assert_eq!(attr.engagement, Engagement::None);
    }
}
