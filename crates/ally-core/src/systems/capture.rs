//! Inhale and Capture Systems
//!
//! `tick_inhale` runs the vacuum: pulls eligible targets down the look
//! cone and converts the closest in-mouth target to captured.
//! `tick_capture` runs the mouth: pins the captured target, applies the
//! periodic damage pulse, and resolves the four exits (escape, swallow,
//! spit, expel). At most one exit fires per tick, checked in that order;
//! a player captive only ever leaves through the escape mash.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;
use tracing::debug;

use ally_events::SimEvent;

use crate::behavior::inhale::{eligible_capture_target, in_cone};
use crate::components::{
    Captured, CaptureState, Companion, CompanionTimers, Escape, Look, OwnedBy,
    Position, StableId,
};
use crate::config::Tuning;
use crate::nav::{ProjectileKind, ProjectileSpec, SideEffect, SideEffects, SoundCue};
use crate::spatial::{EntitySnapshot, SpatialIndex};
use crate::systems::motion::{TargetEffect, TargetEffects};
use crate::{SimClock, SimRng, TickEvents};

/// Vacuum pull, capture transition, and the fruitless-inhale timeout.
#[allow(clippy::too_many_arguments)]
pub fn tick_inhale(
    tuning: Res<Tuning>,
    clock: Res<SimClock>,
    spatial: Res<SpatialIndex>,
    mut rng: ResMut<SimRng>,
    mut effects: ResMut<TargetEffects>,
    mut events: ResMut<TickEvents>,
    mut query: Query<(
        Entity,
        &StableId,
        &Position,
        &Look,
        Option<&OwnedBy>,
        &mut Companion,
        &mut CaptureState,
        &mut CompanionTimers,
    )>,
) {
    for (entity, sid, pos, look, owned, mut companion, mut capture, mut timers) in
        query.iter_mut()
    {
        if !companion.inhaling {
            timers.inhale_age = 0;
            continue;
        }
        if capture.has_captured() {
            companion.inhaling = false;
            timers.inhale_age = 0;
            continue;
        }
        timers.inhale_age += 1;
        if timers.inhale_age > tuning.inhale.timeout_ticks {
            debug!(creature = %sid.0, "inhale timed out");
            companion.inhaling = false;
            timers.inhale_age = 0;
            continue;
        }

        let owner = owned.map(|o| o.0);
        let range = tuning.inhale.range;
        let mut mouth: Option<(&EntitySnapshot, f32)> = None;
        for snap in spatial.query_nearby(pos.0, range, entity) {
            if !eligible_capture_target(snap, sid.0, owner, &tuning) {
                continue;
            }
            if !in_cone(pos.0, look.0, snap.pos, tuning.inhale.cone_dot) {
                continue;
            }
            let d = snap.pos.distance(pos.0);
            if d <= tuning.inhale.mouth_range {
                if mouth.map(|(_, best)| d < best).unwrap_or(true) {
                    mouth = Some((snap, d));
                }
            } else {
                let strength = tuning.inhale.pull_strength * (1.0 - d / range);
                let dir = (pos.0 - snap.pos).normalize_or_zero();
                effects.push(snap.entity, TargetEffect::Impulse(dir * strength));
            }
        }

        if let Some((snap, _)) = mouth {
            let escape = snap.player.map(|(crouch, sprint)| Escape {
                presses: 0,
                required: rng.0.gen_range(
                    tuning.capture.escape_presses_min..=tuning.capture.escape_presses_max,
                ),
                prev_crouch: crouch,
                prev_sprint: sprint,
            });
            capture.captured = Some(Captured {
                entity: snap.entity,
                id: snap.id,
                mouth_age: 0,
                escape,
            });
            companion.inhaling = false;
            timers.inhale_age = 0;
            effects.push(snap.entity, TargetEffect::SetHidden(true));
            effects.push(snap.entity, TargetEffect::SetInvulnerable(true));
            effects.push(snap.entity, TargetEffect::SetPosition(pos.0));
            events.push(
                clock.tick,
                SimEvent::Captured {
                    creature: sid.0,
                    target: snap.id,
                },
            );
        }
    }
}

fn release_target(effects: &mut TargetEffects, target: Entity, at: Vec3) {
    effects.push(target, TargetEffect::SetHidden(false));
    effects.push(target, TargetEffect::SetInvulnerable(false));
    effects.push(target, TargetEffect::SetPosition(at));
}

/// Mouth management for creatures holding a captured target.
#[allow(clippy::too_many_arguments)]
pub fn tick_capture(
    tuning: Res<Tuning>,
    clock: Res<SimClock>,
    spatial: Res<SpatialIndex>,
    mut rng: ResMut<SimRng>,
    mut effects: ResMut<TargetEffects>,
    mut events: ResMut<TickEvents>,
    mut fx: ResMut<SideEffects>,
    mut query: Query<(
        Entity,
        &StableId,
        &Position,
        &Look,
        Option<&OwnedBy>,
        &mut CaptureState,
        &mut CompanionTimers,
    )>,
) {
    for (entity, sid, pos, look, owned, mut capture, mut timers) in query.iter_mut() {
        let Some(mut cap) = capture.captured else {
            continue;
        };
        let Some(target) = spatial.get_id(cap.id).copied() else {
            // target despawned out from under us
            capture.captured = None;
            continue;
        };
        let mouth_at = pos.0 + look.horizontal() * 0.4;

        // escape mash, players only
        if let Some(esc) = cap.escape.as_mut() {
            if let Some((crouch, sprint)) = target.player {
                if crouch != esc.prev_crouch || sprint != esc.prev_sprint {
                    // both flags flipping in one tick still counts once
                    esc.presses += 1;
                    esc.prev_crouch = crouch;
                    esc.prev_sprint = sprint;
                }
            }
            if esc.presses >= esc.required {
                release_target(&mut effects, target.entity, mouth_at);
                // the countdown loses one step later this same tick
                timers.pushback = tuning.capture.pushback_ticks + 1;
                events.push(
                    clock.tick,
                    SimEvent::Escaped {
                        creature: sid.0,
                        target: cap.id,
                        presses: esc.presses,
                    },
                );
                fx.push(SideEffect::Sound {
                    at: pos.0,
                    cue: SoundCue::Escape,
                });
                capture.captured = None;
                continue;
            }
        }

        // the escape mash is the only exit for player captives; the
        // automatic exits below never run while an escape counter exists

        // swallow a target that died in the mouth
        if cap.escape.is_none() && !target.alive {
            effects.push(target.entity, TargetEffect::Despawn);
            events.push(
                clock.tick,
                SimEvent::Swallowed {
                    creature: sid.0,
                    target: cap.id,
                },
            );
            fx.push(SideEffect::Sound {
                at: pos.0,
                cue: SoundCue::Swallow,
            });
            capture.captured = None;
            continue;
        }

        // spit a star at a nearby hostile
        let owner = owned.map(|o| o.0);
        let hostile = if cap.escape.is_none() {
            spatial
                .query_nearby(pos.0, tuning.capture.spit_scan_radius, entity)
                .filter(|s| {
                    s.id != cap.id
                        && (s.monster
                            || s.menace_target == Some(sid.0)
                            || (owner.is_some() && s.menace_target == owner))
                })
                .min_by(|a, b| {
                    a.pos
                        .distance_squared(pos.0)
                        .total_cmp(&b.pos.distance_squared(pos.0))
                })
                .copied()
        } else {
            None
        };
        if let Some(hostile) = hostile {
            let dir = (hostile.pos - pos.0).normalize_or_zero();
            effects.push(target.entity, TargetEffect::Despawn);
            fx.push(SideEffect::Projectile(ProjectileSpec {
                kind: ProjectileKind::Star,
                shooter: sid.0,
                origin: pos.0 + dir * 0.5,
                direction: dir,
                speed: tuning.capture.star_speed,
                damage: tuning.capture.star_damage,
                knockback: tuning.capture.star_knockback,
            }));
            fx.push(SideEffect::Sound {
                at: pos.0,
                cue: SoundCue::Spit,
            });
            timers.spit_face = tuning.capture.spit_face_ticks;
            events.push(
                clock.tick,
                SimEvent::Spat {
                    creature: sid.0,
                    target: cap.id,
                },
            );
            capture.captured = None;
            continue;
        }

        // weakened non-players sometimes squirm free
        if cap.escape.is_none()
            && target.health_ratio() < tuning.capture.expel_health_ratio
            && rng.0.gen_bool(tuning.capture.expel_chance)
        {
            let angle = rng.0.gen_range(0.0..std::f32::consts::TAU);
            let out = Vec3::new(angle.cos(), 0.0, angle.sin());
            release_target(&mut effects, target.entity, mouth_at);
            effects.push(
                target.entity,
                TargetEffect::Impulse(
                    out * tuning.capture.expel_speed
                        + Vec3::Y * tuning.capture.expel_lift,
                ),
            );
            events.push(
                clock.tick,
                SimEvent::Expelled {
                    creature: sid.0,
                    target: cap.id,
                },
            );
            capture.captured = None;
            continue;
        }

        // keep pinned; the mouth grinds non-player captives only
        effects.push(target.entity, TargetEffect::SetPosition(mouth_at));
        cap.mouth_age += 1;
        if cap.escape.is_none() && cap.mouth_age % tuning.capture.mouth_damage_interval == 0 {
            effects.push(
                target.entity,
                TargetEffect::Damage {
                    amount: tuning.capture.mouth_damage,
                    pierce: true,
                },
            );
        }
        capture.captured = Some(cap);
    }
}
