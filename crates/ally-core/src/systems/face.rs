//! Derived Face and Health Tier
//!
//! Recomputed from authoritative state every tick. The only lasting bit
//! here is the low-health edge latch, which keeps the warning event a
//! one-shot per excursion below the threshold.

use bevy_ecs::prelude::*;

use ally_events::SimEvent;

use crate::components::{
    CaptureState, Companion, CompanionTimers, Face, FaceState, HealthTier, StableId,
    Vitals,
};
use crate::{SimClock, TickEvents};

/// Precedence order for the face: spitting, stuffed, inhaling, flying,
/// weary, idle.
pub fn face_for(
    spitting: bool,
    stuffed: bool,
    inhaling: bool,
    flying: bool,
    tier: HealthTier,
) -> Face {
    if spitting {
        Face::Spitting
    } else if stuffed {
        Face::Stuffed
    } else if inhaling {
        Face::Inhaling
    } else if flying {
        Face::Flying
    } else if tier == HealthTier::Low {
        Face::Weary
    } else {
        Face::Idle
    }
}

pub fn derive_faces(
    clock: Res<SimClock>,
    mut events: ResMut<TickEvents>,
    mut query: Query<(
        &StableId,
        &Vitals,
        &Companion,
        &CaptureState,
        &CompanionTimers,
        &mut FaceState,
    )>,
) {
    for (sid, vitals, companion, capture, timers, mut face) in query.iter_mut() {
        let tier = HealthTier::from_ratio(vitals.ratio());
        face.face = face_for(
            timers.spit_face > 0,
            capture.has_captured(),
            companion.inhaling,
            companion.flying,
            tier,
        );
        if tier == HealthTier::Low {
            if !face.low_signal_sent && vitals.alive {
                events.push(clock.tick, SimEvent::LowHealth { creature: sid.0 });
                face.low_signal_sent = true;
            }
        } else {
            face.low_signal_sent = false;
        }
        face.tier = tier;
    }
}
