//! Patrol Behavior
//!
//! Roams around a fixed anchor point. The anchor is set where the
//! creature stood when the order first took effect and survives
//! save/load; re-issuing the Patrol order does not move it.

use glam::Vec3;
use rand::Rng;

use ally_events::AllyCommand;

use crate::nav::{block_of, LocomotionOrder};

use super::{pick_waypoint, BodyRef, Ctx};

#[derive(Debug, Clone, Copy, Default)]
pub struct PatrolState {
    cooldown: u32,
}

pub fn can_start(_state: &PatrolState, body: &BodyRef) -> bool {
    body.order == Some(AllyCommand::Patrol)
}

pub fn on_start(state: &mut PatrolState, body: &mut BodyRef, _ctx: &mut Ctx) {
    if body.anchor.center.is_none() {
        body.anchor.center = Some(block_of(body.pos.0));
    }
    state.cooldown = 0;
}

pub fn on_stop(_state: &mut PatrolState, body: &mut BodyRef, ctx: &mut Ctx) {
    ctx.locomotion.push(LocomotionOrder::Stop { entity: body.entity });
}

pub fn on_tick(state: &mut PatrolState, body: &mut BodyRef, ctx: &mut Ctx) {
    if state.cooldown > 0 {
        state.cooldown -= 1;
        return;
    }
    let Some(center) = body.anchor.center else {
        return;
    };
    let center = Vec3::new(
        center.x as f32 + 0.5,
        center.y as f32,
        center.z as f32 + 0.5,
    );
    let cmd = &ctx.tuning.command;
    let radius = cmd.patrol_radius;
    let attempts = cmd.patrol_attempts;
    let (lo, hi) = (cmd.patrol_cooldown_min, cmd.patrol_cooldown_max);
    let footprint = body.footprint;
    if let Some(target) = pick_waypoint(ctx, center, radius, attempts, footprint) {
        ctx.locomotion.push(LocomotionOrder::NavigateTo {
            entity: body.entity,
            target,
            speed: ctx.tuning.command.roam_speed,
        });
    }
    state.cooldown = ctx.rng.gen_range(lo..=hi);
}
