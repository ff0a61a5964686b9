//! Ally Command Enum
//!
//! The four commands an owner can issue to a managed creature. Owners
//! cycle through them round-robin with an empty-hand interaction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Movement command governing a managed creature's default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllyCommand {
    /// Stay close to the owner and follow when they move.
    #[default]
    Follow,
    /// Remain at the current position.
    Stay,
    /// Walk around aimlessly, ignoring the owner.
    Wander,
    /// Roam within a fixed radius of an anchored center point.
    Patrol,
}

impl AllyCommand {
    /// All commands in cycle order.
    pub const ALL: [AllyCommand; 4] = [
        AllyCommand::Follow,
        AllyCommand::Stay,
        AllyCommand::Wander,
        AllyCommand::Patrol,
    ];

    /// Returns the next command in round-robin order.
    pub fn next(self) -> Self {
        let idx = self.ordinal() as usize;
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Stable ordinal used by the persisted schema.
    pub fn ordinal(self) -> u8 {
        match self {
            AllyCommand::Follow => 0,
            AllyCommand::Stay => 1,
            AllyCommand::Wander => 2,
            AllyCommand::Patrol => 3,
        }
    }

    /// Reverse of [`ordinal`](Self::ordinal). Unknown values fall back to
    /// the default command rather than failing the load.
    pub fn from_ordinal(ordinal: u8) -> Self {
        *Self::ALL.get(ordinal as usize).unwrap_or(&AllyCommand::Follow)
    }
}

impl fmt::Display for AllyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllyCommand::Follow => write!(f, "follow"),
            AllyCommand::Stay => write!(f, "stay"),
            AllyCommand::Wander => write!(f, "wander"),
            AllyCommand::Patrol => write!(f, "patrol"),
        }
    }
}
