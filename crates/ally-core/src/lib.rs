//! Companion creature behavior core.
//!
//! A per-tick, priority-arbitrated state machine governing a companion
//! creature's capture (inhale/swallow), carry/throw, escape-resistance,
//! and command-following behaviors, plus the ownership registry that
//! extends the command behaviors to generic allies.
//!
//! The simulation is single threaded and deterministic: all systems run
//! in a fixed chained order once per tick, every stochastic decision
//! draws from one seeded [`SimRng`], and external inputs are applied only
//! between ticks.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod behavior;
pub mod components;
pub mod config;
pub mod inputs;
pub mod nav;
pub mod persist;
pub mod registry;
pub mod sim;
pub mod spatial;
pub mod systems;

pub use components::*;
pub use config::Tuning;
pub use inputs::AllyInput;
pub use registry::AllyRegistry;
pub use sim::Simulation;

/// Seeded random number generator resource.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// Monotonic simulation clock.
#[derive(Resource, Debug, Default)]
pub struct SimClock {
    pub tick: u64,
}

/// Resource collecting the domain events generated this tick.
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    events: Vec<ally_events::StampedEvent>,
}

impl TickEvents {
    pub fn push(&mut self, tick: u64, event: ally_events::SimEvent) {
        self.events.push(ally_events::StampedEvent::new(tick, event));
    }

    pub fn drain(&mut self) -> Vec<ally_events::StampedEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ally_events::StampedEvent> {
        self.events.iter()
    }
}
