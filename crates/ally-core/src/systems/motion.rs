//! Effect Buffer and Motion Integration
//!
//! Systems never write another entity's components directly. They queue
//! [`TargetEffect`]s against the live handle and `apply_effects` lands
//! the whole batch at a fixed point in the tick, so the outcome does not
//! depend on which system observed the target first.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::{CarryState, Footprint, Position, Velocity, Visibility, Vitals};
use crate::nav::Navigation;

/// Per-tick gravity applied to airborne entities.
pub const GRAVITY: f32 = 0.08;
/// Per-tick velocity damping.
pub const DRAG: f32 = 0.91;

/// A deferred mutation of one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetEffect {
    /// Adds to velocity.
    Impulse(Vec3),
    /// Moves the entity and zeroes its velocity.
    SetPosition(Vec3),
    SetHidden(bool),
    SetInvulnerable(bool),
    /// Applies damage. `pierce` ignores the invulnerable flag, for the
    /// mouth pulse that must reach a captured (protected) target.
    Damage { amount: f32, pierce: bool },
    Despawn,
}

/// Buffered cross-entity mutations for this tick.
#[derive(Resource, Debug, Default)]
pub struct TargetEffects {
    queue: Vec<(Entity, TargetEffect)>,
}

impl TargetEffects {
    pub fn push(&mut self, target: Entity, effect: TargetEffect) {
        self.queue.push((target, effect));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Applies every queued effect in queue order.
pub fn apply_effects(world: &mut World) {
    let queue = std::mem::take(&mut world.resource_mut::<TargetEffects>().queue);
    for (target, effect) in queue {
        match effect {
            TargetEffect::Impulse(v) => {
                if let Some(mut vel) = world.get_mut::<Velocity>(target) {
                    vel.0 += v;
                }
            }
            TargetEffect::SetPosition(p) => {
                if let Some(mut pos) = world.get_mut::<Position>(target) {
                    pos.0 = p;
                }
                if let Some(mut vel) = world.get_mut::<Velocity>(target) {
                    vel.0 = Vec3::ZERO;
                }
            }
            TargetEffect::SetHidden(hidden) => {
                if let Some(mut vis) = world.get_mut::<Visibility>(target) {
                    vis.hidden = hidden;
                }
            }
            TargetEffect::SetInvulnerable(invulnerable) => {
                if let Some(mut vis) = world.get_mut::<Visibility>(target) {
                    vis.invulnerable = invulnerable;
                }
            }
            TargetEffect::Damage { amount, pierce } => {
                let shielded = world
                    .get::<Visibility>(target)
                    .map(|v| v.invulnerable)
                    .unwrap_or(false);
                if shielded && !pierce {
                    continue;
                }
                if let Some(mut vitals) = world.get_mut::<Vitals>(target) {
                    vitals.health -= amount;
                    if vitals.health <= 0.0 {
                        vitals.alive = false;
                    }
                }
            }
            TargetEffect::Despawn => {
                world.despawn(target);
            }
        }
    }
}

/// Euler step for every live entity: position, gravity, drag, and a
/// ground clamp from the navigation oracle. Held creatures are pinned by
/// the carry system and skip integration.
pub fn integrate_motion(
    nav: Res<Navigation>,
    mut query: Query<(
        &mut Position,
        &mut Velocity,
        &Footprint,
        &Vitals,
        Option<&CarryState>,
    )>,
) {
    for (mut pos, mut vel, _fp, vitals, carry) in query.iter_mut() {
        if !vitals.alive {
            continue;
        }
        if matches!(carry, Some(CarryState::Held { .. })) {
            continue;
        }
        pos.0 += vel.0;
        vel.0.y -= GRAVITY;
        vel.0 *= DRAG;
        if let Some(ground) = nav.0.ground_height(pos.0.x, pos.0.z, pos.0.y) {
            if pos.0.y < ground {
                pos.0.y = ground;
                vel.0.y = 0.0;
            }
        }
    }
}
