//! Save Capture
//!
//! Serializes the durable fields of every companion and registry ally
//! into the logical save schema. Restore lives on [`crate::Simulation`],
//! which owns resource setup and entity spawning.

use bevy_ecs::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

use ally_events::{AllySave, CompanionSave, CreatureRecord, WorldSave};

use crate::components::{
    AllyOrder, CaptureState, CarryState, Companion, FaceState, OwnedBy, PatrolAnchor,
    Position, StableId, Vitals,
};
use crate::SimClock;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("save encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Captures the durable state of the world. Players and transient mobs
/// are the host's to persist; only companions and registry allies are
/// ours.
pub fn capture_save(world: &mut World) -> WorldSave {
    let tick = world.resource::<SimClock>().tick;

    let mut companions = Vec::new();
    let mut query = world.query::<(
        &StableId,
        &Position,
        &Vitals,
        Option<&OwnedBy>,
        Option<&AllyOrder>,
        &Companion,
        &CaptureState,
        &CarryState,
        &FaceState,
        &PatrolAnchor,
    )>();
    for (sid, pos, vitals, owned, order, companion, capture, carry, face, anchor) in
        query.iter(world)
    {
        companions.push(CompanionSave {
            id: sid.0,
            position: pos.0.to_array(),
            health: vitals.health,
            max_health: vitals.max_health,
            owner: owned.map(|o| o.0),
            record: CreatureRecord {
                color: companion.color,
                lives: companion.lives,
                command: order.map(|o| o.0).unwrap_or_default(),
                flying: companion.flying,
                health_state: face.tier.ordinal(),
                carry_state: carry.tag(),
                captured_entity_id: capture.captured_id(),
                holding_entity_id: carry.holder_id(),
                patrol_center: anchor.center.map(|c| c.to_array()),
            },
        });
    }

    let mut allies = Vec::new();
    let mut query = world.query_filtered::<(
        &StableId,
        &OwnedBy,
        Option<&AllyOrder>,
        &Position,
        &Vitals,
        &PatrolAnchor,
    ), Without<Companion>>();
    for (sid, owned, order, pos, vitals, anchor) in query.iter(world) {
        allies.push(AllySave {
            id: sid.0,
            owner: owned.0,
            command: order.map(|o| o.0).unwrap_or_default(),
            position: pos.0.to_array(),
            health: vitals.health,
            max_health: vitals.max_health,
            patrol_center: anchor.center.map(|c| c.to_array()),
        });
    }

    WorldSave {
        tick,
        companions,
        allies,
    }
}

pub fn write_save(path: impl AsRef<Path>, save: &WorldSave) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(save)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn read_save(path: impl AsRef<Path>) -> Result<WorldSave, PersistError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
