//! Mirror Protocol
//!
//! The one-directional synchronization contract between authoritative
//! simulation state and the presentation side. Each tick the core diffs
//! the exposed field set against what it last sent and emits a
//! [`MirrorUpdate`] holding only the fields that changed. A
//! [`CreatureMirror`] consumes updates and never writes back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AllyCommand;

/// Carry sub-state as exposed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CarryTag {
    #[default]
    None,
    Held,
    Thrown,
}

impl CarryTag {
    /// Stable ordinal used by the persisted schema.
    pub fn ordinal(self) -> u8 {
        match self {
            CarryTag::None => 0,
            CarryTag::Held => 1,
            CarryTag::Thrown => 2,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            1 => CarryTag::Held,
            2 => CarryTag::Thrown,
            _ => CarryTag::None,
        }
    }
}

/// One exposed field with its new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum MirrorField {
    Color(i32),
    Lives(u32),
    Command(AllyCommand),
    Inhaling(bool),
    HasCaptured(bool),
    Flying(bool),
    HealthState(i32),
    CarryState(CarryTag),
}

/// Partial update for a single creature, delivered once per tick at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorUpdate {
    pub creature: Uuid,
    pub tick: u64,
    pub fields: Vec<MirrorField>,
}

/// Observer-side copy of the exposed field set.
///
/// Values start at the same defaults the authoritative side uses, so a
/// mirror constructed at creature spawn time converges after the first
/// update even if it missed none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureMirror {
    pub color: i32,
    pub lives: u32,
    pub command: AllyCommand,
    pub inhaling: bool,
    pub has_captured: bool,
    pub flying: bool,
    pub health_state: i32,
    pub carry_state: CarryTag,
}

impl Default for CreatureMirror {
    fn default() -> Self {
        Self {
            color: -1,
            lives: crate::record::DEFAULT_LIVES,
            command: AllyCommand::Follow,
            inhaling: false,
            has_captured: false,
            flying: false,
            health_state: 0,
            carry_state: CarryTag::None,
        }
    }
}

impl CreatureMirror {
    /// Applies a partial update. Unknown-to-us ordering is irrelevant:
    /// updates are per-field absolute values, not deltas.
    pub fn apply(&mut self, update: &MirrorUpdate) {
        for field in &update.fields {
            match *field {
                MirrorField::Color(v) => self.color = v,
                MirrorField::Lives(v) => self.lives = v,
                MirrorField::Command(v) => self.command = v,
                MirrorField::Inhaling(v) => self.inhaling = v,
                MirrorField::HasCaptured(v) => self.has_captured = v,
                MirrorField::Flying(v) => self.flying = v,
                MirrorField::HealthState(v) => self.health_state = v,
                MirrorField::CarryState(v) => self.carry_state = v,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_overwrites_only_listed_fields() {
        let mut mirror = CreatureMirror::default();
        let update = MirrorUpdate {
            creature: Uuid::nil(),
            tick: 7,
            fields: vec![MirrorField::Inhaling(true), MirrorField::HealthState(2)],
        };
        mirror.apply(&update);
        assert!(mirror.inhaling);
        assert_eq!(mirror.health_state, 2);
        // untouched fields keep their defaults
        assert_eq!(mirror.color, -1);
        assert_eq!(mirror.carry_state, CarryTag::None);
    }

    #[test]
    fn carry_tag_ordinal_round_trip() {
        for tag in [CarryTag::None, CarryTag::Held, CarryTag::Thrown] {
            assert_eq!(CarryTag::from_ordinal(tag.ordinal()), tag);
        }
    }

    #[test]
    fn update_serialization_shape() {
        let update = MirrorUpdate {
            creature: Uuid::nil(),
            tick: 3,
            fields: vec![MirrorField::Lives(2)],
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains(r#""field":"lives""#), "{json}");
        assert!(json.contains(r#""value":2"#), "{json}");
        let back: MirrorUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, update);
    }
}
