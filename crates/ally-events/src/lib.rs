//! Shared data types for the companion simulation.
//!
//! This crate contains pure data structures with no simulation logic:
//! the command enum, domain events, the one-directional mirror protocol,
//! and the persisted creature schema. It is a dependency for all other
//! crates in the workspace.

pub mod command;
pub mod event;
pub mod mirror;
pub mod record;

pub use command::AllyCommand;
pub use event::{SimEvent, StampedEvent};
pub use mirror::{CarryTag, CreatureMirror, MirrorField, MirrorUpdate};
pub use record::{
    AllySave, CompanionSave, CreatureRecord, WorldSave, DEFAULT_LIVES,
};
