//! Inhale Behavior
//!
//! Starts the vacuum attack when a threat wanders into range. The pull,
//! capture, and timeout mechanics run in the capture systems; this
//! behavior only decides when the creature opens its mouth and keeps it
//! facing the threat while it does.

use glam::Vec3;
use uuid::Uuid;

use crate::nav::{LocomotionOrder, SideEffect, SoundCue};
use crate::spatial::EntitySnapshot;

use super::{BodyRef, Ctx};

#[derive(Debug, Clone, Copy, Default)]
pub struct InhaleState;

/// Forward-cone test shared with the pull mechanics.
pub fn in_cone(from: Vec3, look: Vec3, target: Vec3, cone_dot: f32) -> bool {
    let to = target - from;
    let dir = to.normalize_or_zero();
    if dir == Vec3::ZERO {
        // standing inside the mouth counts as in front
        return true;
    }
    look.normalize_or_zero().dot(dir) > cone_dot
}

/// Whether a snapshot is something the mouth can act on at all: alive,
/// targetable, not the creature itself or its owner, and small enough to
/// fit the mouth.
pub fn eligible_capture_target(
    snap: &EntitySnapshot,
    creature: Uuid,
    owner: Option<Uuid>,
    tuning: &crate::config::Tuning,
) -> bool {
    snap.id != creature
        && Some(snap.id) != owner
        && snap.alive
        && !snap.hidden
        && !snap.invulnerable
        && snap.width <= tuning.inhale.max_target_width
        && snap.height <= tuning.inhale.max_target_height
}

/// A threat worth opening the mouth for: an eligible target that is
/// hostile outright or currently menacing the creature or its owner.
fn is_threat(snap: &EntitySnapshot, creature: Uuid, owner: Option<Uuid>) -> bool {
    snap.monster
        || snap.menace_target == Some(creature)
        || (owner.is_some() && snap.menace_target == owner)
}

fn nearest_threat<'a>(body: &BodyRef, ctx: &'a Ctx) -> Option<&'a EntitySnapshot> {
    let range = ctx.tuning.inhale.range;
    ctx.spatial
        .query_nearby(body.pos.0, range, body.entity)
        .filter(|s| {
            eligible_capture_target(s, body.id, body.owner, ctx.tuning)
                && is_threat(s, body.id, body.owner)
        })
        .min_by(|a, b| {
            a.pos
                .distance_squared(body.pos.0)
                .total_cmp(&b.pos.distance_squared(body.pos.0))
        })
}

pub fn can_start(_state: &InhaleState, body: &BodyRef, ctx: &mut Ctx) -> bool {
    body.companion.is_some() && !body.has_captured && nearest_threat(body, ctx).is_some()
}

pub fn can_continue(_state: &InhaleState, body: &BodyRef, _ctx: &mut Ctx) -> bool {
    // the capture systems clear the flag on capture or timeout
    body.companion.as_ref().map(|c| c.inhaling).unwrap_or(false) && !body.has_captured
}

pub fn on_start(_state: &mut InhaleState, body: &mut BodyRef, ctx: &mut Ctx) {
    if let Some(companion) = body.companion.as_deref_mut() {
        companion.inhaling = true;
    }
    ctx.locomotion.push(LocomotionOrder::Stop { entity: body.entity });
    ctx.fx.push(SideEffect::Sound {
        at: body.pos.0,
        cue: SoundCue::InhaleStart,
    });
}

pub fn on_stop(_state: &mut InhaleState, body: &mut BodyRef, _ctx: &mut Ctx) {
    if let Some(companion) = body.companion.as_deref_mut() {
        companion.inhaling = false;
    }
}

pub fn on_tick(_state: &mut InhaleState, body: &mut BodyRef, ctx: &mut Ctx) {
    if let Some(threat_pos) = nearest_threat(body, ctx).map(|s| s.pos) {
        let dir = (threat_pos - body.pos.0).normalize_or_zero();
        if dir != Vec3::ZERO {
            body.look.0 = dir;
        }
    }
}
