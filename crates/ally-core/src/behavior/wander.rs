//! Wander Behavior
//!
//! Aimless roaming around wherever the creature currently is. Runs for
//! the Wander order and for creatures with no order at all, as the
//! lowest-priority fallback.

use rand::Rng;

use ally_events::AllyCommand;

use crate::nav::LocomotionOrder;

use super::{pick_waypoint, BodyRef, Ctx};

#[derive(Debug, Clone, Copy, Default)]
pub struct WanderState {
    cooldown: u32,
}

pub fn can_start(_state: &WanderState, body: &BodyRef) -> bool {
    matches!(body.order, Some(AllyCommand::Wander) | None)
}

pub fn on_start(state: &mut WanderState, _body: &mut BodyRef, _ctx: &mut Ctx) {
    state.cooldown = 0;
}

pub fn on_stop(_state: &mut WanderState, body: &mut BodyRef, ctx: &mut Ctx) {
    ctx.locomotion.push(LocomotionOrder::Stop { entity: body.entity });
}

pub fn on_tick(state: &mut WanderState, body: &mut BodyRef, ctx: &mut Ctx) {
    if state.cooldown > 0 {
        state.cooldown -= 1;
        return;
    }
    let cmd = &ctx.tuning.command;
    let radius = cmd.wander_radius;
    let attempts = cmd.patrol_attempts;
    let (lo, hi) = (cmd.patrol_cooldown_min, cmd.patrol_cooldown_max);
    let center = body.pos.0;
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
