//! Behavior Arbitration
//!
//! Fixed-priority behavior slots evaluated once per tick. Each slot
//! declares the control channels it needs (move, look, jump); a slot may
//! start only when no higher-priority active slot holds a conflicting
//! channel, and an active slot is stopped the tick its channels are
//! claimed above it or its continue condition fails. Start and stop
//! hooks are always paired.

use bevy_ecs::prelude::*;
use bitflags::bitflags;
use glam::Vec3;
use rand::rngs::SmallRng;
use uuid::Uuid;

use ally_events::AllyCommand;

use crate::components::{
    movement_locked, AllyOrder, CaptureState, CarryState, Companion, CompanionTimers,
    Footprint, Look, OwnedBy, PatrolAnchor, Position, StableId, Velocity,
};
use crate::config::Tuning;
use crate::nav::{LocomotionQueue, NavOracle, Navigation, SideEffects};
use crate::spatial::SpatialIndex;
use crate::{SimClock, SimRng};

pub mod follow;
pub mod inhale;
pub mod patrol;
pub mod stay;
pub mod wander;

pub use follow::FollowState;
pub use inhale::InhaleState;
pub use patrol::PatrolState;
pub use wander::WanderState;

bitflags! {
    /// Control channels a behavior claims while active.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BehaviorFlags: u8 {
        const MOVE = 1;
        const LOOK = 2;
        const JUMP = 4;
    }
}

/// Mutable view of the entity the behaviors steer this tick.
pub struct BodyRef<'a> {
    pub entity: Entity,
    pub id: Uuid,
    pub pos: &'a mut Position,
    pub vel: &'a mut Velocity,
    pub look: &'a mut Look,
    pub footprint: Footprint,
    pub anchor: &'a mut PatrolAnchor,
    pub owner: Option<Uuid>,
    pub order: Option<AllyCommand>,
    pub companion: Option<&'a mut Companion>,
    pub has_captured: bool,
}

/// Shared per-tick context: tuning, snapshots, and the outbound buffers.
pub struct Ctx<'a> {
    pub tuning: &'a Tuning,
    pub tick: u64,
    pub spatial: &'a SpatialIndex,
    pub nav: &'a dyn NavOracle,
    pub rng: &'a mut SmallRng,
    pub locomotion: &'a mut LocomotionQueue,
    pub fx: &'a mut SideEffects,
}

/// A behavior and its private state.
#[derive(Debug, Clone)]
pub enum BehaviorKind {
    Inhale(InhaleState),
    FollowOwner(FollowState),
    Stay,
    Patrol(PatrolState),
    Wander(WanderState),
}

impl BehaviorKind {
    pub fn flags(&self) -> BehaviorFlags {
        match self {
            BehaviorKind::Inhale(_) => BehaviorFlags::MOVE | BehaviorFlags::LOOK,
            BehaviorKind::FollowOwner(_) => BehaviorFlags::MOVE | BehaviorFlags::LOOK,
            BehaviorKind::Stay => BehaviorFlags::MOVE | BehaviorFlags::JUMP,
            BehaviorKind::Patrol(_) => BehaviorFlags::MOVE,
            BehaviorKind::Wander(_) => BehaviorFlags::MOVE,
        }
    }

    fn can_start(&self, body: &BodyRef, ctx: &mut Ctx) -> bool {
        match self {
            BehaviorKind::Inhale(s) => inhale::can_start(s, body, ctx),
            BehaviorKind::FollowOwner(s) => follow::can_start(s, body, ctx),
            BehaviorKind::Stay => stay::can_start(body),
            BehaviorKind::Patrol(s) => patrol::can_start(s, body),
            BehaviorKind::Wander(s) => wander::can_start(s, body),
        }
    }

    fn can_continue(&self, body: &BodyRef, ctx: &mut Ctx) -> bool {
        match self {
            BehaviorKind::Inhale(s) => inhale::can_continue(s, body, ctx),
            BehaviorKind::FollowOwner(s) => follow::can_continue(s, body, ctx),
            BehaviorKind::Stay => stay::can_start(body),
            BehaviorKind::Patrol(s) => patrol::can_start(s, body),
            BehaviorKind::Wander(s) => wander::can_start(s, body),
        }
    }

    fn on_start(&mut self, body: &mut BodyRef, ctx: &mut Ctx) {
        match self {
            BehaviorKind::Inhale(s) => inhale::on_start(s, body, ctx),
            BehaviorKind::FollowOwner(s) => follow::on_start(s, body, ctx),
            BehaviorKind::Stay => stay::on_start(body, ctx),
            BehaviorKind::Patrol(s) => patrol::on_start(s, body, ctx),
            BehaviorKind::Wander(s) => wander::on_start(s, body, ctx),
        }
    }

    fn on_stop(&mut self, body: &mut BodyRef, ctx: &mut Ctx) {
        match self {
            BehaviorKind::Inhale(s) => inhale::on_stop(s, body, ctx),
            BehaviorKind::FollowOwner(s) => follow::on_stop(s, body, ctx),
            BehaviorKind::Stay => {}
            BehaviorKind::Patrol(s) => patrol::on_stop(s, body, ctx),
            BehaviorKind::Wander(s) => wander::on_stop(s, body, ctx),
        }
    }

    fn on_tick(&mut self, body: &mut BodyRef, ctx: &mut Ctx) {
        match self {
            BehaviorKind::Inhale(s) => inhale::on_tick(s, body, ctx),
            BehaviorKind::FollowOwner(s) => follow::on_tick(s, body, ctx),
            BehaviorKind::Stay => {}
            BehaviorKind::Patrol(s) => patrol::on_tick(s, body, ctx),
            BehaviorKind::Wander(s) => wander::on_tick(s, body, ctx),
        }
    }
}

/// One prioritized behavior slot.
#[derive(Debug, Clone)]
pub struct BehaviorSlot {
    pub priority: u8,
    pub active: bool,
    pub kind: BehaviorKind,
}

impl BehaviorSlot {
    fn new(priority: u8, kind: BehaviorKind) -> Self {
        Self {
            priority,
            active: false,
            kind,
        }
    }
}

/// The entity's behavior slots, kept sorted by ascending priority value
/// (lower value wins arbitration).
#[derive(Component, Debug, Clone, Default)]
pub struct BehaviorSet {
    pub slots: Vec<BehaviorSlot>,
}

impl BehaviorSet {
    /// Full companion slate: inhale outranks everything so a staying
    /// companion still defends itself.
    pub fn companion() -> Self {
        Self {
            slots: vec![
                BehaviorSlot::new(1, BehaviorKind::Inhale(InhaleState::default())),
                BehaviorSlot::new(2, BehaviorKind::Stay),
                BehaviorSlot::new(4, BehaviorKind::FollowOwner(FollowState::default())),
                BehaviorSlot::new(5, BehaviorKind::Patrol(PatrolState::default())),
                BehaviorSlot::new(6, BehaviorKind::Wander(WanderState::default())),
            ],
        }
    }

    /// Command behaviors only, for registry-managed generic allies.
    pub fn ally() -> Self {
        Self {
            slots: vec![
                BehaviorSlot::new(2, BehaviorKind::Stay),
                BehaviorSlot::new(4, BehaviorKind::FollowOwner(FollowState::default())),
                BehaviorSlot::new(5, BehaviorKind::Patrol(PatrolState::default())),
                BehaviorSlot::new(6, BehaviorKind::Wander(WanderState::default())),
            ],
        }
    }

    pub fn active_priorities(&self) -> Vec<u8> {
        self.slots
            .iter()
            .filter(|s| s.active)
            .map(|s| s.priority)
            .collect()
    }
}

/// Runs arbitration and the tick hooks for every behavior-driven entity.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn run_behaviors(
    tuning: Res<Tuning>,
    clock: Res<SimClock>,
    spatial: Res<SpatialIndex>,
    nav: Res<Navigation>,
    mut rng: ResMut<SimRng>,
    mut locomotion: ResMut<LocomotionQueue>,
    mut fx: ResMut<SideEffects>,
    mut query: Query<(
        Entity,
        &StableId,
        &mut Position,
        &mut Velocity,
        &mut Look,
        &Footprint,
        &mut BehaviorSet,
        &mut PatrolAnchor,
        Option<&OwnedBy>,
        Option<&AllyOrder>,
        Option<&mut Companion>,
        Option<&CaptureState>,
        Option<&CarryState>,
        Option<&CompanionTimers>,
    )>,
) {
    for (
        entity,
        sid,
        mut pos,
        mut vel,
        mut look,
        fp,
        mut set,
        mut anchor,
        owned,
        order,
        mut companion,
        capture,
        carry,
        timers,
    ) in query.iter_mut()
    {
        let locked = movement_locked(capture, carry, timers);
        let has_captured = capture.map(|c| c.has_captured()).unwrap_or(false);

        let mut body = BodyRef {
            entity,
            id: sid.0,
            pos: &mut pos,
            vel: &mut vel,
            look: &mut look,
            footprint: *fp,
            anchor: &mut anchor,
            owner: owned.map(|o| o.0),
            order: order.map(|o| o.0),
            companion: companion.as_deref_mut(),
            has_captured,
        };
        let mut ctx = Ctx {
            tuning: &tuning,
            tick: clock.tick,
            spatial: &spatial,
            nav: nav.0.as_ref(),
            rng: &mut rng.0,
            locomotion: &mut locomotion,
            fx: &mut fx,
        };

        if locked {
            for slot in set.slots.iter_mut() {
                if slot.active {
                    slot.kind.on_stop(&mut body, &mut ctx);
                    slot.active = false;
                }
            }
            continue;
        }

        let mut claimed = BehaviorFlags::empty();
        for slot in set.slots.iter_mut() {
            let conflicts = slot.kind.flags().intersects(claimed);
            if slot.active {
                if conflicts || !slot.kind.can_continue(&body, &mut ctx) {
                    slot.kind.on_stop(&mut body, &mut ctx);
                    slot.active = false;
                }
            } else if !conflicts && slot.kind.can_start(&body, &mut ctx) {
                slot.kind.on_start(&mut body, &mut ctx);
                slot.active = true;
            }
            if slot.active {
                claimed |= slot.kind.flags();
            }
        }

        for slot in set.slots.iter_mut() {
            if slot.active {
                slot.kind.on_tick(&mut body, &mut ctx);
            }
        }
    }
}

/// Picks a walkable roam waypoint around `center`, or None if every
/// attempt landed somewhere unusable.
pub(crate) fn pick_waypoint(
    ctx: &mut Ctx,
    center: Vec3,
    radius: f32,
    attempts: u32,
    footprint: Footprint,
) -> Option<Vec3> {
    use rand::Rng;
    let scan = ctx.tuning.command.patrol_ground_scan;
    for _ in 0..attempts {
        let dx = ctx.rng.gen_range(-radius..=radius);
        let dz = ctx.rng.gen_range(-radius..=radius);
        let candidate = center + Vec3::new(dx, 0.0, dz);
        if let Some(spot) = crate::nav::snap_to_ground(
            ctx.nav,
            candidate,
            footprint.width,
            footprint.height,
            scan,
        ) {
            return Some(spot);
        }
    }
    None
}
