//! Companion Components
//!
//! The authoritative sub-states of the companion creature: capture,
//! carry, timers, derived face state, and the durable ally fields.

use bevy_ecs::prelude::*;
use glam::IVec3;
use uuid::Uuid;

use ally_events::{AllyCommand, CarryTag};

/// Marker plus the scalar authoritative fields of a companion creature.
#[derive(Component, Debug, Clone)]
pub struct Companion {
    /// Cosmetic dye color, -1 for the default body color.
    pub color: i32,
    pub lives: u32,
    /// Puffed up with air and slow-falling.
    pub flying: bool,
    /// Vacuum attack currently running.
    pub inhaling: bool,
}

impl Companion {
    pub fn new(lives: u32) -> Self {
        Self {
            color: -1,
            lives,
            flying: false,
            inhaling: false,
        }
    }
}

/// Escape-mash progress for a captured player-controlled target.
///
/// Posture toggles count at most one increment per tick; explicit mash
/// inputs each count. The required threshold is drawn once per capture.
#[derive(Debug, Clone, Copy)]
pub struct Escape {
    pub presses: u32,
    pub required: u32,
    pub prev_crouch: bool,
    pub prev_sprint: bool,
}

/// A target held inside the creature's mouth.
#[derive(Debug, Clone, Copy)]
pub struct Captured {
    /// Live handle, re-resolved from `id` after a restart.
    pub entity: Entity,
    pub id: Uuid,
    /// Ticks since the last mouth-damage pulse.
    pub mouth_age: u32,
    /// Present only when the target is player-controlled.
    pub escape: Option<Escape>,
}

/// Capture sub-state. Mutually exclusive with an active carry sub-state.
#[derive(Component, Debug, Clone, Default)]
pub struct CaptureState {
    pub captured: Option<Captured>,
}

impl CaptureState {
    pub fn has_captured(&self) -> bool {
        self.captured.is_some()
    }

    pub fn captured_id(&self) -> Option<Uuid> {
        self.captured.as_ref().map(|c| c.id)
    }
}

/// Carry sub-state: the creature itself being held or launched.
#[derive(Component, Debug, Clone, Default)]
pub enum CarryState {
    #[default]
    None,
    Held {
        holder: Entity,
        holder_id: Uuid,
    },
    Thrown {
        thrower: Entity,
        thrower_id: Uuid,
        age: u32,
    },
}

impl CarryState {
    pub fn is_none(&self) -> bool {
        matches!(self, CarryState::None)
    }

    pub fn tag(&self) -> CarryTag {
        match self {
            CarryState::None => CarryTag::None,
            CarryState::Held { .. } => CarryTag::Held,
            CarryState::Thrown { .. } => CarryTag::Thrown,
        }
    }

    pub fn holder_id(&self) -> Option<Uuid> {
        match self {
            CarryState::Held { holder_id, .. } => Some(*holder_id),
            _ => None,
        }
    }
}

/// Counted-down timers revisited once per tick. No behavior ever blocks;
/// reaching zero triggers the associated transition on that tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CompanionTimers {
    pub inhale_age: u32,
    pub respawn: u32,
    pub flap: u32,
    pub pushback: u32,
    pub spit_face: u32,
}

/// Health tier derived from the current health ratio each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthTier {
    #[default]
    Full,
    Medium,
    Low,
}

impl HealthTier {
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio > 0.6 {
            HealthTier::Full
        } else if ratio > 0.3 {
            HealthTier::Medium
        } else {
            HealthTier::Low
        }
    }

    /// Informational ordinal exposed through the mirror and saves.
    pub fn ordinal(self) -> i32 {
        match self {
            HealthTier::Full => 0,
            HealthTier::Medium => 1,
            HealthTier::Low => 2,
        }
    }
}

/// Which face the presentation side should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Face {
    #[default]
    Idle,
    Inhaling,
    Stuffed,
    Spitting,
    Flying,
    Weary,
}

/// Derived face/health state, recomputed every tick and never treated as
/// a source of truth.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FaceState {
    pub tier: HealthTier,
    pub face: Face,
    pub low_signal_sent: bool,
}

/// Persisted patrol center for the Patrol command behavior.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PatrolAnchor {
    pub center: Option<IVec3>,
}

/// Durable ownership record on the creature itself. The registry caches
/// this; the component is the source of truth across restarts.
#[derive(Component, Debug, Clone, Copy)]
pub struct OwnedBy(pub Uuid);

/// Durable copy of the creature's current command.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AllyOrder(pub AllyCommand);

/// True while capture, carry, respawn, or pushback suppresses normal
/// locomotion behaviors.
pub fn movement_locked(
    capture: Option<&CaptureState>,
    carry: Option<&CarryState>,
    timers: Option<&CompanionTimers>,
) -> bool {
    capture.map(|c| c.has_captured()).unwrap_or(false)
        || carry.map(|c| !c.is_none()).unwrap_or(false)
        || timers
            .map(|t| t.respawn > 0 || t.pushback > 0)
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(HealthTier::from_ratio(1.0), HealthTier::Full);
        assert_eq!(HealthTier::from_ratio(0.61), HealthTier::Full);
        assert_eq!(HealthTier::from_ratio(0.6), HealthTier::Medium);
        assert_eq!(HealthTier::from_ratio(0.31), HealthTier::Medium);
        assert_eq!(HealthTier::from_ratio(0.3), HealthTier::Low);
        assert_eq!(HealthTier::from_ratio(0.0), HealthTier::Low);
    }

    #[test]
    fn carry_tag_mapping() {
        assert_eq!(CarryState::None.tag(), CarryTag::None);
        let held = CarryState::Held {
            holder: Entity::PLACEHOLDER,
            holder_id: Uuid::nil(),
        };
        assert_eq!(held.tag(), CarryTag::Held);
    }

    #[test]
    fn movement_lock_cases() {
        let idle = CaptureState::default();
        let timers = CompanionTimers::default();
        assert!(!movement_locked(
            Some(&idle),
            Some(&CarryState::None),
            Some(&timers)
        ));

        let pushed = CompanionTimers {
            pushback: 3,
            ..Default::default()
        };
        assert!(movement_locked(Some(&idle), Some(&CarryState::None), Some(&pushed)));

        let held = CarryState::Held {
            holder: Entity::PLACEHOLDER,
            holder_id: Uuid::nil(),
        };
        assert!(movement_locked(Some(&idle), Some(&held), Some(&timers)));
    }
}
