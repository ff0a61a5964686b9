//! Follow Behavior
//!
//! Walks toward the owner when they get too far away, repathing on a
//! fixed cadence. Beyond the teleport distance the creature gives up on
//! walking and relocates to a clear spot beside the owner.

use glam::Vec3;
use rand::Rng;

use ally_events::AllyCommand;

use crate::nav::{snap_to_ground, LocomotionOrder};
use crate::spatial::EntitySnapshot;

use super::{BodyRef, Ctx};

#[derive(Debug, Clone, Copy, Default)]
pub struct FollowState {
    repath: u32,
}

fn owner_snapshot<'a>(body: &BodyRef, ctx: &'a Ctx) -> Option<&'a EntitySnapshot> {
    ctx.spatial.get_id(body.owner?)
}

pub fn can_start(_state: &FollowState, body: &BodyRef, ctx: &mut Ctx) -> bool {
    if body.order != Some(AllyCommand::Follow) {
        return false;
    }
    let Some(owner) = owner_snapshot(body, ctx) else {
        return false;
    };
    owner.pos.distance(body.pos.0) > ctx.tuning.command.follow_start
}

pub fn can_continue(_state: &FollowState, body: &BodyRef, ctx: &mut Ctx) -> bool {
    if body.order != Some(AllyCommand::Follow) {
        return false;
    }
    let Some(owner) = owner_snapshot(body, ctx) else {
        return false;
    };
    owner.pos.distance(body.pos.0) > ctx.tuning.command.follow_stop
}

pub fn on_start(state: &mut FollowState, _body: &mut BodyRef, _ctx: &mut Ctx) {
    state.repath = 0;
}

pub fn on_stop(_state: &mut FollowState, body: &mut BodyRef, ctx: &mut Ctx) {
    ctx.locomotion.push(LocomotionOrder::Stop { entity: body.entity });
}

pub fn on_tick(state: &mut FollowState, body: &mut BodyRef, ctx: &mut Ctx) {
    let Some(owner) = owner_snapshot(body, ctx).copied() else {
        return;
    };

    let teleport = ctx.tuning.command.follow_teleport_distance;
    if owner.pos.distance_squared(body.pos.0) > teleport * teleport {
        try_teleport(body, ctx, owner.pos);
        return;
    }

    let dir = (owner.pos - body.pos.0).normalize_or_zero();
    if dir != Vec3::ZERO {
        body.look.0 = dir;
    }

    if state.repath == 0 {
        ctx.locomotion.push(LocomotionOrder::NavigateTo {
            entity: body.entity,
            target: owner.pos,
            speed: ctx.tuning.command.follow_speed,
        });
        state.repath = ctx.tuning.command.follow_repath_ticks;
    } else {
        state.repath -= 1;
    }
}

/// Relocates to a walkable spot near `anchor`, never directly on top of
/// it. Failing every attempt leaves the creature where it is; it will
/// try again next tick.
fn try_teleport(body: &mut BodyRef, ctx: &mut Ctx, anchor: Vec3) {
    let scan = ctx.tuning.command.patrol_ground_scan;
    for _ in 0..ctx.tuning.command.teleport_attempts {
        let dx: i32 = ctx.rng.gen_range(-3..=3);
        let dz: i32 = ctx.rng.gen_range(-3..=3);
        if dx.abs() < 2 && dz.abs() < 2 {
            continue;
        }
        let candidate = anchor + Vec3::new(dx as f32, 0.0, dz as f32);
        if let Some(spot) = snap_to_ground(
            ctx.nav,
            candidate,
            body.footprint.width,
            body.footprint.height,
            scan,
        ) {
            body.pos.0 = spot;
            body.vel.0 = Vec3::ZERO;
            ctx.locomotion.push(LocomotionOrder::Stop { entity: body.entity });
            return;
        }
    }
}
