//! Carry and Throw System
//!
//! Held creatures ride a fixed offset on their holder every tick. Thrown
//! creatures fly until they strike a living entity, touch ground, or age
//! out; a strike damages both parties and ends the flight.

use bevy_ecs::prelude::*;
use glam::Vec3;
use tracing::debug;

use ally_events::SimEvent;

use crate::components::{
    aabb_overlap, CarryState, Companion, Footprint, Position, StableId, Velocity,
};
use crate::config::Tuning;
use crate::nav::Navigation;
use crate::spatial::SpatialIndex;
use crate::systems::motion::{TargetEffect, TargetEffects};
use crate::{SimClock, TickEvents};

/// Scan radius for in-flight collision candidates. Generous relative to
/// any sane footprint sum.
const HIT_SCAN_RADIUS: f32 = 2.5;

#[allow(clippy::too_many_arguments)]
pub fn tick_carry(
    tuning: Res<Tuning>,
    clock: Res<SimClock>,
    spatial: Res<SpatialIndex>,
    nav: Res<Navigation>,
    mut effects: ResMut<TargetEffects>,
    mut events: ResMut<TickEvents>,
    mut query: Query<
        (
            Entity,
            &StableId,
            &mut Position,
            &mut Velocity,
            &Footprint,
            &mut CarryState,
        ),
        With<Companion>,
    >,
) {
    for (entity, sid, mut pos, mut vel, fp, mut carry) in query.iter_mut() {
        match *carry {
            CarryState::None => {}
            CarryState::Held { holder_id, .. } => {
                let Some(holder) = spatial.get_id(holder_id).copied() else {
                    debug!(creature = %sid.0, "holder gone, dropping");
                    *carry = CarryState::None;
                    events.push(clock.tick, SimEvent::Dropped { creature: sid.0 });
                    continue;
                };
                if !holder.alive {
                    *carry = CarryState::None;
                    events.push(clock.tick, SimEvent::Dropped { creature: sid.0 });
                    continue;
                }
                let look_h = Vec3::new(holder.look.x, 0.0, holder.look.z).normalize_or_zero();
                let right = Vec3::new(-look_h.z, 0.0, look_h.x);
                pos.0 = holder.pos
                    + Vec3::Y * tuning.carry.hold_up
                    + look_h * tuning.carry.hold_forward
                    + right * tuning.carry.hold_lateral;
                vel.0 = Vec3::ZERO;
            }
            CarryState::Thrown { thrower_id, age, .. } => {
                let age = age + 1;

                let hit = spatial
                    .query_nearby(pos.0, HIT_SCAN_RADIUS, entity)
                    .filter(|s| s.id != thrower_id && !s.hidden)
                    .find(|s| aabb_overlap(pos.0, *fp, s.pos, s.footprint()))
                    .copied();
                if let Some(hit) = hit {
                    let knock = vel.0.normalize_or_zero() * 0.5 + Vec3::Y * 0.2;
                    effects.push(
                        hit.entity,
                        TargetEffect::Damage {
                            amount: tuning.carry.hit_damage,
                            pierce: false,
                        },
                    );
                    effects.push(hit.entity, TargetEffect::Impulse(knock));
                    effects.push(
                        entity,
                        TargetEffect::Damage {
                            amount: tuning.carry.self_damage,
                            pierce: false,
                        },
                    );
                    events.push(
                        clock.tick,
                        SimEvent::ThrowHit {
                            creature: sid.0,
                            target: hit.id,
                        },
                    );
                    vel.0 *= 0.25;
                    *carry = CarryState::None;
                    continue;
                }

                let grounded = nav
                    .0
                    .ground_height(pos.0.x, pos.0.z, pos.0.y)
                    .map(|g| pos.0.y <= g + 0.01)
                    .unwrap_or(false);
                if age >= tuning.carry.thrown_max_age || (grounded && age > 2) {
                    *carry = CarryState::None;
                } else if let CarryState::Thrown { age: a, .. } = &mut *carry {
                    *a = age;
                }
            }
        }
    }
}
