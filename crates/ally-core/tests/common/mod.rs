//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use ally_events::StampedEvent;
use ally_core::{Simulation, Tuning};

pub fn sim(seed: u64) -> Simulation {
    Simulation::new(seed, Tuning::default())
}

/// The serialized event tag, for comparing streams without comparing the
/// run-specific ids inside them.
pub fn event_tag(event: &StampedEvent) -> String {
    serde_json::to_value(&event.event)
        .expect("event serializes")
        .get("type")
        .and_then(|v| v.as_str())
        .expect("tagged event")
        .to_owned()
}

/// Runs until the predicate matches an event, returning the matching
/// events; panics after `max_ticks`.
pub fn run_until(
    sim: &mut Simulation,
    max_ticks: u64,
    mut pred: impl FnMut(&StampedEvent) -> bool,
) -> Vec<StampedEvent> {
    for _ in 0..max_ticks {
        sim.tick();
        let events = sim.drain_events();
        if events.iter().any(&mut pred) {
            return events;
        }
    }
    panic!("no matching event within {max_ticks} ticks");
}
