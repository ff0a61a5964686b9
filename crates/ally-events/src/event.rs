//! Domain Events
//!
//! Discrete things that happened inside the behavior core during a tick.
//! Events are append-only observations: consumers may log them, render
//! them, or ignore them, but they never feed back into authoritative state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// A target was pulled into the creature's mouth.
    Captured { creature: Uuid, target: Uuid },
    /// The captured target died in the mouth and was consumed.
    Swallowed { creature: Uuid, target: Uuid },
    /// A weakened non-player target was released unharmed.
    Expelled { creature: Uuid, target: Uuid },
    /// The captured target was converted into a star projectile.
    Spat { creature: Uuid, target: Uuid },
    /// A captured player broke free by mashing inputs.
    Escaped {
        creature: Uuid,
        target: Uuid,
        presses: u32,
    },
    /// The owner picked the creature up.
    PickedUp { creature: Uuid, holder: Uuid },
    /// The held creature was launched.
    Thrown { creature: Uuid, holder: Uuid },
    /// A thrown creature collided with a living entity.
    ThrowHit { creature: Uuid, target: Uuid },
    /// The holder became invalid and the creature fell free.
    Dropped { creature: Uuid },
    /// A lethal hit was absorbed by consuming a life.
    LifeLost { creature: Uuid, lives_left: u32 },
    /// The respawn countdown finished and the creature was restored.
    Respawned { creature: Uuid },
    /// The creature crossed into the low-health tier.
    LowHealth { creature: Uuid },
    /// A creature was befriended and entered the ally registry.
    Befriended { creature: Uuid, owner: Uuid },
    /// A creature was removed from the ally registry.
    Released { creature: Uuid, owner: Uuid },
    /// The creature's command changed.
    CommandChanged {
        creature: Uuid,
        command: crate::AllyCommand,
    },
}

/// An event with the tick on which it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub event: SimEvent,
}

impl StampedEvent {
    pub fn new(tick: u64, event: SimEvent) -> Self {
        Self { tick, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AllyCommand;

    #[test]
    fn event_serializes_with_tag() {
        let id = Uuid::nil();
        let ev = SimEvent::LifeLost {
            creature: id,
            lives_left: 2,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains(r#""type":"life_lost""#), "{json}");
        assert!(json.contains(r#""lives_left":2"#), "{json}");
    }

    #[test]
    fn stamped_event_flattens() {
        let ev = StampedEvent::new(
            42,
            SimEvent::CommandChanged {
                creature: Uuid::nil(),
                command: AllyCommand::Stay,
            },
        );
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains(r#""tick":42"#), "{json}");
        assert!(json.contains(r#""type":"command_changed""#), "{json}");

        let back: StampedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }
}
