//! Persisted Schema
//!
//! Logical save/restore types for the durable creature fields. The
//! encoding is plain serde; every optional field has a documented default
//! so a malformed or missing entry degrades instead of failing the load.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mirror::CarryTag;
use crate::AllyCommand;

/// Lives granted to a fresh companion and restored when the field is
/// absent from a save.
pub const DEFAULT_LIVES: u32 = 3;

fn default_lives() -> u32 {
    DEFAULT_LIVES
}

fn default_color() -> i32 {
    -1
}

/// Durable per-creature fields, matching the authoritative state the
/// companion carries across world save/load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    /// Cosmetic dye color, -1 for the default body color.
    #[serde(default = "default_color")]
    pub color: i32,
    #[serde(default = "default_lives")]
    pub lives: u32,
    #[serde(default)]
    pub command: AllyCommand,
    #[serde(default)]
    pub flying: bool,
    /// Informational copy of the derived health tier. Re-derived from the
    /// health ratio after load; never authoritative.
    #[serde(default)]
    pub health_state: i32,
    #[serde(default)]
    pub carry_state: CarryTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_entity_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_entity_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patrol_center: Option<[i32; 3]>,
}

impl Default for CreatureRecord {
    fn default() -> Self {
        Self {
            color: -1,
            lives: DEFAULT_LIVES,
            command: AllyCommand::Follow,
            flying: false,
            health_state: 0,
            carry_state: CarryTag::None,
            captured_entity_id: None,
            holding_entity_id: None,
            patrol_center: None,
        }
    }
}

/// One saved companion: world placement plus the durable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionSave {
    pub id: Uuid,
    pub position: [f32; 3],
    pub health: f32,
    pub max_health: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uuid>,
    pub record: CreatureRecord,
}

/// One saved generic ally (a registry-managed creature that is not a
/// companion). Only the ownership and command fields are durable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllySave {
    pub id: Uuid,
    pub owner: Uuid,
    #[serde(default)]
    pub command: AllyCommand,
    pub position: [f32; 3],
    pub health: f32,
    pub max_health: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patrol_center: Option<[i32; 3]>,
}

/// Whole-world durable state for the behavior core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldSave {
    pub tick: u64,
    #[serde(default)]
    pub companions: Vec<CompanionSave>,
    #[serde(default)]
    pub allies: Vec<AllySave>,
}
