//! External Inputs
//!
//! Host-originated commands, applied between ticks against the live
//! world. Because nothing else runs concurrently, inputs may mutate
//! entities directly instead of going through the effect buffer.

use bevy_ecs::prelude::*;
use glam::Vec3;
use tracing::debug;
use uuid::Uuid;

use ally_events::{AllyCommand, SimEvent};

use crate::components::{
    CaptureState, CarryState, Companion, Look, OwnedBy, PlayerFlags, Position,
    Velocity, Visibility, Vitals,
};
use crate::config::Tuning;
use crate::nav::{ProjectileKind, ProjectileSpec, SideEffect, SideEffects, SoundCue};
use crate::registry::{self, find_by_id};
use crate::{SimClock, TickEvents};

/// One host command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllyInput {
    Befriend { creature: Uuid, owner: Uuid },
    Release { creature: Uuid },
    CycleCommand { creature: Uuid },
    SetCommand { creature: Uuid, command: AllyCommand },
    /// Owner picks the creature up. Refused unless the requester owns
    /// the creature and its carry state is empty. If the creature holds
    /// a captured target, the target is released first; the two
    /// sub-states never coexist.
    Pickup { creature: Uuid, holder: Uuid },
    Throw { creature: Uuid },
    /// One escape-mash press from a captured player.
    CapturedMash { player: Uuid },
    GiveLife { creature: Uuid },
    Dye { creature: Uuid, color: i32 },
    StartFlying { creature: Uuid },
    StopFlying { creature: Uuid },
    SetPosture {
        player: Uuid,
        crouching: bool,
        sprinting: bool,
    },
    /// External damage from the host (combat, hazards).
    Damage { target: Uuid, amount: f32 },
}

fn push_event(world: &mut World, event: SimEvent) {
    let tick = world.resource::<SimClock>().tick;
    world.resource_mut::<TickEvents>().push(tick, event);
}

/// Releases a captured target in place. Used when a stronger transition
/// (pickup, release by owner) preempts the capture.
fn force_release(world: &mut World, creature: Entity) {
    let Some(mut capture) = world.get_mut::<CaptureState>(creature) else {
        return;
    };
    let Some(cap) = capture.captured.take() else {
        return;
    };
    let at = world
        .get::<Position>(creature)
        .map(|p| p.0)
        .unwrap_or_default();
    if let Some(target) = registry::find_by_id(world, cap.id) {
        if let Some(mut vis) = world.get_mut::<Visibility>(target) {
            vis.hidden = false;
            vis.invulnerable = false;
        }
        if let Some(mut pos) = world.get_mut::<Position>(target) {
            pos.0 = at;
        }
        if let Some(mut vel) = world.get_mut::<Velocity>(target) {
            vel.0 = Vec3::ZERO;
        }
    }
}

/// Applies one input. Unknown ids and invalid state transitions are
/// ignored; inputs are requests, not invariants.
pub fn apply(world: &mut World, input: AllyInput) {
    match input {
        AllyInput::Befriend { creature, owner } => {
            registry::add_ally(world, creature, owner);
        }
        AllyInput::Release { creature } => {
            registry::remove_ally(world, creature);
        }
        AllyInput::CycleCommand { creature } => {
            registry::cycle_command(world, creature);
        }
        AllyInput::SetCommand { creature, command } => {
            registry::set_command(world, creature, command);
        }
        AllyInput::Pickup { creature, holder } => {
            let Some(entity) = find_by_id(world, creature) else {
                return;
            };
            let Some(holder_entity) = find_by_id(world, holder) else {
                return;
            };
            let owned = world.get::<OwnedBy>(entity).map(|o| o.0);
            if owned != Some(holder) {
                debug!(%creature, %holder, "pickup refused, not the owner");
                return;
            }
            let occupied = world
                .get::<CarryState>(entity)
                .map(|c| !c.is_none())
                .unwrap_or(true);
            if occupied {
                debug!(%creature, "pickup refused, already held or in flight");
                return;
            }
            force_release(world, entity);
            if let Some(mut companion) = world.get_mut::<Companion>(entity) {
                companion.inhaling = false;
            }
            if let Some(mut carry) = world.get_mut::<CarryState>(entity) {
                *carry = CarryState::Held {
                    holder: holder_entity,
                    holder_id: holder,
                };
            }
            push_event(world, SimEvent::PickedUp { creature, holder });
        }
        AllyInput::Throw { creature } => {
            let Some(entity) = find_by_id(world, creature) else {
                return;
            };
            let Some(&CarryState::Held { holder, holder_id }) =
                world.get::<CarryState>(entity)
            else {
                return;
            };
            let dir = world
                .get::<Look>(holder)
                .map(|l| l.0.normalize_or_zero())
                .unwrap_or(Vec3::Z);
            let speed = world.resource::<Tuning>().carry.throw_speed;
            let at = world
                .get::<Position>(entity)
                .map(|p| p.0)
                .unwrap_or_default();
            if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
                vel.0 = dir * speed;
            }
            if let Some(mut carry) = world.get_mut::<CarryState>(entity) {
                *carry = CarryState::Thrown {
                    thrower: holder,
                    thrower_id: holder_id,
                    age: 0,
                };
            }
            world.resource_mut::<SideEffects>().push(SideEffect::Sound {
                at,
                cue: SoundCue::Throw,
            });
            push_event(
                world,
                SimEvent::Thrown {
                    creature,
                    holder: holder_id,
                },
            );
        }
        AllyInput::CapturedMash { player } => {
            let mut query = world.query::<&mut CaptureState>();
            for mut capture in query.iter_mut(world) {
                if let Some(cap) = capture.captured.as_mut() {
                    if cap.id == player {
                        if let Some(esc) = cap.escape.as_mut() {
                            esc.presses += 1;
                        }
                        break;
                    }
                }
            }
        }
        AllyInput::GiveLife { creature } => {
            if let Some(entity) = find_by_id(world, creature) {
                if let Some(mut companion) = world.get_mut::<Companion>(entity) {
                    companion.lives += 1;
                }
            }
        }
        AllyInput::Dye { creature, color } => {
            if let Some(entity) = find_by_id(world, creature) {
                if let Some(mut companion) = world.get_mut::<Companion>(entity) {
                    companion.color = color;
                }
            }
        }
        AllyInput::StartFlying { creature } => {
            let Some(entity) = find_by_id(world, creature) else {
                return;
            };
            let busy = world
                .get::<CaptureState>(entity)
                .map(|c| c.has_captured())
                .unwrap_or(false)
                || world
                    .get::<CarryState>(entity)
                    .map(|c| !c.is_none())
                    .unwrap_or(false);
            if busy {
                return;
            }
            if let Some(mut companion) = world.get_mut::<Companion>(entity) {
                companion.flying = true;
            }
        }
        AllyInput::StopFlying { creature } => {
            let Some(entity) = find_by_id(world, creature) else {
                return;
            };
            let was_flying = world
                .get::<Companion>(entity)
                .map(|c| c.flying)
                .unwrap_or(false);
            if !was_flying {
                return;
            }
            if let Some(mut companion) = world.get_mut::<Companion>(entity) {
                companion.flying = false;
            }
            let pos = world
                .get::<Position>(entity)
                .map(|p| p.0)
                .unwrap_or_default();
            let dir = world
                .get::<Look>(entity)
                .map(|l| l.horizontal())
                .unwrap_or(Vec3::Z);
            let speed = world.resource::<Tuning>().flight.air_bullet_speed;
            world
                .resource_mut::<SideEffects>()
                .push(SideEffect::Projectile(ProjectileSpec {
                    kind: ProjectileKind::AirBullet,
                    shooter: creature,
                    origin: pos + dir * 0.5,
                    direction: dir,
                    speed,
                    damage: 1.0,
                    knockback: 0.5,
                }));
        }
        AllyInput::SetPosture {
            player,
            crouching,
            sprinting,
        } => {
            if let Some(entity) = find_by_id(world, player) {
                if let Some(mut flags) = world.get_mut::<PlayerFlags>(entity) {
                    flags.crouching = crouching;
                    flags.sprinting = sprinting;
                }
            }
        }
        AllyInput::Damage { target, amount } => {
            let Some(entity) = find_by_id(world, target) else {
                return;
            };
            let shielded = world
                .get::<Visibility>(entity)
                .map(|v| v.invulnerable)
                .unwrap_or(false);
            if shielded {
                return;
            }
            if let Some(mut vitals) = world.get_mut::<Vitals>(entity) {
                vitals.health -= amount;
                if vitals.health <= 0.0 {
                    vitals.alive = false;
                }
            }
        }
    }
}
