//! Flight System
//!
//! While puffed up the creature flaps on a fixed cadence for lift and
//! its falls are damped. Flight starts on a host input and ends either
//! on the stop input (with an air-bullet exhale) or on ground contact
//! while descending.

use bevy_ecs::prelude::*;

use crate::components::{Companion, CompanionTimers, Position, Velocity};
use crate::config::Tuning;
use crate::nav::{Navigation, SideEffect, SideEffects, SoundCue};

pub fn tick_flight(
    tuning: Res<Tuning>,
    nav: Res<Navigation>,
    mut fx: ResMut<SideEffects>,
    mut query: Query<(&mut Companion, &Position, &mut Velocity, &mut CompanionTimers)>,
) {
    for (mut companion, pos, mut vel, mut timers) in query.iter_mut() {
        if !companion.flying {
            timers.flap = 0;
            continue;
        }

        // settling onto ground ends the flight quietly; the flap-cycle
        // guard keeps a ground-level takeoff from cancelling instantly
        let grounded = nav
            .0
            .ground_height(pos.0.x, pos.0.z, pos.0.y)
            .map(|g| pos.0.y <= g + 0.01)
            .unwrap_or(false);
        if grounded && vel.0.y <= 0.0 && timers.flap > 0 {
            companion.flying = false;
            timers.flap = 0;
            continue;
        }

        if timers.flap == 0 {
            vel.0.y += tuning.flight.flap_boost;
            timers.flap = tuning.flight.flap_interval;
            fx.push(SideEffect::Sound {
                at: pos.0,
                cue: SoundCue::Flap,
            });
        } else {
            timers.flap -= 1;
        }
        if vel.0.y < 0.0 {
            vel.0.y *= tuning.flight.fall_damping;
        }
    }
}
