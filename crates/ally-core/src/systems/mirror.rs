//! Mirror Emission
//!
//! Diffs the exposed field set against what was last sent and queues a
//! partial update for any creature with at least one change. The cache
//! lives on the creature so a creature and its mirror stream die
//! together.

use bevy_ecs::prelude::*;

use ally_events::{CreatureMirror, MirrorField, MirrorUpdate};

use crate::components::{AllyOrder, CaptureState, CarryState, Companion, FaceState, StableId};
use crate::SimClock;

/// Last field values sent for this creature.
#[derive(Component, Debug, Clone, Default)]
pub struct MirrorCache(pub CreatureMirror);

/// Outbound mirror updates, drained by the host each tick.
#[derive(Resource, Debug, Default)]
pub struct MirrorFeed {
    updates: Vec<MirrorUpdate>,
}

impl MirrorFeed {
    pub fn drain(&mut self) -> Vec<MirrorUpdate> {
        std::mem::take(&mut self.updates)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MirrorUpdate> {
        self.updates.iter()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

pub fn emit_mirror(
    clock: Res<SimClock>,
    mut feed: ResMut<MirrorFeed>,
    mut query: Query<(
        &StableId,
        &Companion,
        Option<&AllyOrder>,
        &CaptureState,
        &CarryState,
        &FaceState,
        &mut MirrorCache,
    )>,
) {
    for (sid, companion, order, capture, carry, face, mut cache) in query.iter_mut() {
        let command = order.map(|o| o.0).unwrap_or_default();
        let mut fields = Vec::new();

        if cache.0.color != companion.color {
            fields.push(MirrorField::Color(companion.color));
        }
        if cache.0.lives != companion.lives {
            fields.push(MirrorField::Lives(companion.lives));
        }
        if cache.0.command != command {
            fields.push(MirrorField::Command(command));
        }
        if cache.0.inhaling != companion.inhaling {
            fields.push(MirrorField::Inhaling(companion.inhaling));
        }
        if cache.0.has_captured != capture.has_captured() {
            fields.push(MirrorField::HasCaptured(capture.has_captured()));
        }
        if cache.0.flying != companion.flying {
            fields.push(MirrorField::Flying(companion.flying));
        }
        let health_state = face.tier.ordinal();
        if cache.0.health_state != health_state {
            fields.push(MirrorField::HealthState(health_state));
        }
        let carry_tag = carry.tag();
        if cache.0.carry_state != carry_tag {
            fields.push(MirrorField::CarryState(carry_tag));
        }

        if fields.is_empty() {
            continue;
        }
        let update = MirrorUpdate {
            creature: sid.0,
            tick: clock.tick,
            fields,
        };
        cache.0.apply(&update);
        feed.updates.push(update);
    }
}
