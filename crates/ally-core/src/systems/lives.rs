//! Lives and Respawn System
//!
//! A companion with lives remaining never finishes dying. The lethal hit
//! is intercepted here (after the effect batch has landed), a life is
//! consumed, and the creature sits out a masked respawn countdown. The
//! last life is final.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;
use tracing::{debug, info};

use ally_events::SimEvent;

use crate::components::{
    CaptureState, CarryState, Companion, CompanionTimers, Footprint, OwnedBy,
    Position, StableId, Velocity, Visibility, Vitals,
};
use crate::config::Tuning;
use crate::nav::{snap_to_ground, Navigation, SideEffect, SideEffects, SoundCue};
use crate::spatial::SpatialIndex;
use crate::systems::motion::{TargetEffect, TargetEffects};
use crate::{SimClock, SimRng, TickEvents};

#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn tick_lives(
    tuning: Res<Tuning>,
    clock: Res<SimClock>,
    spatial: Res<SpatialIndex>,
    nav: Res<Navigation>,
    mut rng: ResMut<SimRng>,
    mut effects: ResMut<TargetEffects>,
    mut events: ResMut<TickEvents>,
    mut fx: ResMut<SideEffects>,
    mut query: Query<(
        Entity,
        &StableId,
        &mut Position,
        &mut Velocity,
        &Footprint,
        Option<&OwnedBy>,
        &mut Vitals,
        &mut Visibility,
        &mut Companion,
        &mut CaptureState,
        &mut CarryState,
        &mut CompanionTimers,
    )>,
) {
    for (
        entity,
        sid,
        mut pos,
        mut vel,
        fp,
        owned,
        mut vitals,
        mut vis,
        mut companion,
        mut capture,
        mut carry,
        mut timers,
    ) in query.iter_mut()
    {
        timers.pushback = timers.pushback.saturating_sub(1);
        timers.spit_face = timers.spit_face.saturating_sub(1);

        if timers.respawn > 0 {
            timers.respawn -= 1;
            if timers.respawn == 0 {
                vitals.health = vitals.max_health;
                vitals.alive = true;
                vis.hidden = false;
                vis.invulnerable = false;
                vel.0 = Vec3::ZERO;

                // come back beside the owner when possible
                if let Some(owner) = owned.and_then(|o| spatial.get_id(o.0)) {
                    let mut spot = owner.pos;
                    for _ in 0..tuning.command.teleport_attempts {
                        let dx: i32 = rng.0.gen_range(-3..=3);
                        let dz: i32 = rng.0.gen_range(-3..=3);
                        if dx.abs() < 2 && dz.abs() < 2 {
                            continue;
                        }
                        let candidate =
                            owner.pos + Vec3::new(dx as f32, 0.0, dz as f32);
                        if let Some(s) = snap_to_ground(
                            nav.0.as_ref(),
                            candidate,
                            fp.width,
                            fp.height,
                            tuning.command.patrol_ground_scan,
                        ) {
                            spot = s;
                            break;
                        }
                    }
                    pos.0 = spot;
                }

                info!(creature = %sid.0, "respawned");
                events.push(clock.tick, SimEvent::Respawned { creature: sid.0 });
                fx.push(SideEffect::Sound {
                    at: pos.0,
                    cue: SoundCue::Respawn,
                });
            }
            continue;
        }

        if vitals.health > 0.0 && vitals.alive {
            continue;
        }

        // lethal hit landed this tick
        if let Some(cap) = capture.captured.take() {
            effects.push(cap.entity, TargetEffect::SetHidden(false));
            effects.push(cap.entity, TargetEffect::SetInvulnerable(false));
            effects.push(cap.entity, TargetEffect::SetPosition(pos.0));
        }
        *carry = CarryState::None;
        companion.inhaling = false;
        companion.flying = false;
        timers.inhale_age = 0;

        if companion.lives > 1 {
            companion.lives -= 1;
            vitals.alive = true;
            vitals.health = tuning.lives.masked_health;
            vis.hidden = true;
            vis.invulnerable = true;
            vel.0 = Vec3::ZERO;
            timers.respawn = tuning.lives.respawn_ticks;
            debug!(creature = %sid.0, lives = companion.lives, "life consumed");
            events.push(
                clock.tick,
                SimEvent::LifeLost {
                    creature: sid.0,
                    lives_left: companion.lives,
                },
            );
            fx.push(SideEffect::Sound {
                at: pos.0,
                cue: SoundCue::LifeLost,
            });
        } else {
            companion.lives = 0;
            vitals.alive = false;
            info!(creature = %sid.0, "final death");
            events.push(
                clock.tick,
                SimEvent::LifeLost {
                    creature: sid.0,
                    lives_left: 0,
                },
            );
            effects.push(entity, TargetEffect::Despawn);
        }
    }
}
