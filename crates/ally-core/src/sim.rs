//! Simulation Facade
//!
//! Owns the world, the fixed tick schedule, and the input queue. One
//! call to [`Simulation::tick`] applies the queued inputs and runs every
//! stage once, in order. All host interaction goes through this type.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::Schedule;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use uuid::Uuid;

use ally_events::{StampedEvent, WorldSave};

use crate::behavior::{run_behaviors, BehaviorSet};
use crate::components::{
    AllyOrder, CaptureState, Captured, CarryState, Companion, CompanionTimers, Escape,
    Face, FaceState, Footprint, HealthTier, Look, Menace, OwnedBy, PatrolAnchor,
    PlayerFlags, Position, StableId, Velocity, Visibility, Vitals,
};
use crate::config::Tuning;
use crate::inputs::{self, AllyInput};
use crate::nav::{LocomotionOrder, LocomotionQueue, Navigation, SideEffect, SideEffects};
use crate::persist;
use crate::registry::{self, AllyRegistry};
use crate::spatial::{rebuild_spatial_index, SpatialIndex};
use crate::systems::{
    apply_effects, derive_faces, emit_mirror, integrate_motion, tick_capture,
    tick_carry, tick_flight, tick_inhale, tick_lives, MirrorCache, MirrorFeed,
    TargetEffects,
};
use crate::{SimClock, SimRng, TickEvents};

use ally_events::MirrorUpdate;

fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.tick += 1;
}

pub struct Simulation {
    world: World,
    schedule: Schedule,
    pending: Vec<AllyInput>,
}

impl Simulation {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut world = World::new();
        world.insert_resource(tuning);
        world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
        world.init_resource::<SimClock>();
        world.init_resource::<TickEvents>();
        world.init_resource::<SpatialIndex>();
        world.init_resource::<Navigation>();
        world.init_resource::<LocomotionQueue>();
        world.init_resource::<SideEffects>();
        world.init_resource::<MirrorFeed>();
        world.init_resource::<AllyRegistry>();
        world.init_resource::<TargetEffects>();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                rebuild_spatial_index,
                run_behaviors,
                tick_inhale,
                tick_capture,
                tick_carry,
                tick_flight,
                apply_effects,
                integrate_motion,
                tick_lives,
                derive_faces,
                emit_mirror,
                advance_clock,
            )
                .chain(),
        );

        info!(seed, "simulation initialized");
        Self {
            world,
            schedule,
            pending: Vec::new(),
        }
    }

    /// Queues an input for the next tick boundary.
    pub fn queue_input(&mut self, input: AllyInput) {
        self.pending.push(input);
    }

    /// Applies queued inputs, then runs one full tick.
    pub fn tick(&mut self) {
        for input in std::mem::take(&mut self.pending) {
            inputs::apply(&mut self.world, input);
        }
        self.schedule.run(&mut self.world);
    }

    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.world.resource::<SimClock>().tick
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn drain_events(&mut self) -> Vec<StampedEvent> {
        self.world.resource_mut::<TickEvents>().drain()
    }

    pub fn drain_mirror(&mut self) -> Vec<MirrorUpdate> {
        self.world.resource_mut::<MirrorFeed>().drain()
    }

    pub fn drain_side_effects(&mut self) -> Vec<SideEffect> {
        self.world.resource_mut::<SideEffects>().drain()
    }

    pub fn drain_locomotion(&mut self) -> Vec<LocomotionOrder> {
        self.world.resource_mut::<LocomotionQueue>().drain()
    }

    pub fn find_entity(&mut self, id: Uuid) -> Option<Entity> {
        registry::find_by_id(&mut self.world, id)
    }

    /// Spawns a fully wired companion creature. With an owner it is
    /// registered as an ally on the spot.
    pub fn spawn_companion(&mut self, pos: Vec3, owner: Option<Uuid>) -> Uuid {
        let lives = self.world.resource::<Tuning>().lives.starting_lives;
        let id = Uuid::new_v4();
        self.world.spawn((
            StableId(id),
            Position(pos),
            Velocity::default(),
            Look::default(),
            Footprint::new(0.8, 0.8),
            Vitals::new(20.0),
            Visibility::default(),
            Companion::new(lives),
            CaptureState::default(),
            CarryState::default(),
            CompanionTimers::default(),
            FaceState::default(),
            PatrolAnchor::default(),
            (BehaviorSet::companion(), MirrorCache::default()),
        ));
        if let Some(owner) = owner {
            registry::add_ally(&mut self.world, id, owner);
        }
        id
    }

    /// Spawns a registry-managed generic ally (command behaviors, no
    /// companion mechanics).
    pub fn spawn_ally(&mut self, pos: Vec3, owner: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.world.spawn((
            StableId(id),
            Position(pos),
            Velocity::default(),
            Look::default(),
            Footprint::new(0.7, 1.0),
            Vitals::new(20.0),
            Visibility::default(),
            PatrolAnchor::default(),
            BehaviorSet::ally(),
        ));
        registry::add_ally(&mut self.world, id, owner);
        id
    }

    pub fn spawn_player(&mut self, pos: Vec3) -> Uuid {
        let id = Uuid::new_v4();
        self.world.spawn((
            StableId(id),
            Position(pos),
            Velocity::default(),
            Look::default(),
            Footprint::new(0.6, 1.8),
            Vitals::new(20.0),
            Visibility::default(),
            PlayerFlags::default(),
        ));
        id
    }

    pub fn spawn_mob(
        &mut self,
        pos: Vec3,
        footprint: Footprint,
        health: f32,
        monster: bool,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.world.spawn((
            StableId(id),
            Position(pos),
            Velocity::default(),
            Look::default(),
            footprint,
            Vitals::new(health),
            Visibility::default(),
            Menace {
                monster,
                target: None,
            },
        ));
        id
    }

    /// Captures the durable world state.
    pub fn save(&mut self) -> WorldSave {
        persist::capture_save(&mut self.world)
    }

    /// Rebuilds a simulation from a save. Players and transient mobs are
    /// not in the save; captured/held references to them resolve against
    /// whatever the host respawns before the first tick, and anything
    /// still unresolved is dropped cleanly.
    pub fn from_save(seed: u64, tuning: Tuning, save: &WorldSave) -> Self {
        let mut sim = Self::new(seed, tuning);
        sim.world.resource_mut::<SimClock>().tick = save.tick;

        let mut pending: Vec<(Entity, Option<Uuid>, Option<Uuid>)> = Vec::new();
        for saved in &save.companions {
            let entity = sim
                .world
                .spawn((
                    StableId(saved.id),
                    Position(Vec3::from_array(saved.position)),
                    Velocity::default(),
                    Look::default(),
                    Footprint::new(0.8, 0.8),
                    Vitals {
                        health: saved.health,
                        max_health: saved.max_health,
                        alive: saved.health > 0.0,
                    },
                    Visibility::default(),
                    Companion {
                        color: saved.record.color,
                        lives: saved.record.lives,
                        flying: saved.record.flying,
                        inhaling: false,
                    },
                    CaptureState::default(),
                    CarryState::default(),
                    CompanionTimers::default(),
                    FaceState {
                        tier: HealthTier::from_ratio(if saved.max_health > 0.0 {
                            saved.health / saved.max_health
                        } else {
                            0.0
                        }),
                        face: Face::Idle,
                        low_signal_sent: false,
                    },
                    PatrolAnchor {
                        center: saved.record.patrol_center.map(Into::into),
                    },
                    (BehaviorSet::companion(), MirrorCache::default()),
                ))
                .id();
            if let Some(owner) = saved.owner {
                sim.world
                    .entity_mut(entity)
                    .insert((OwnedBy(owner), AllyOrder(saved.record.command)));
            }
            pending.push((
                entity,
                saved.record.captured_entity_id,
                saved.record.holding_entity_id,
            ));
        }

        for saved in &save.allies {
            sim.world.spawn((
                StableId(saved.id),
                Position(Vec3::from_array(saved.position)),
                Velocity::default(),
                Look::default(),
                Footprint::new(0.7, 1.0),
                Vitals {
                    health: saved.health,
                    max_health: saved.max_health,
                    alive: saved.health > 0.0,
                },
                Visibility::default(),
                PatrolAnchor {
                    center: saved.patrol_center.map(Into::into),
                },
                BehaviorSet::ally(),
                OwnedBy(saved.owner),
                AllyOrder(saved.command),
            ));
        }

        for (entity, captured_id, holder_id) in pending {
            if let Some(target_id) = captured_id {
                if let Some(target) = registry::find_by_id(&mut sim.world, target_id) {
                    let escape = if sim.world.get::<PlayerFlags>(target).is_some() {
                        let tuning = sim.world.resource::<Tuning>();
                        let (lo, hi) = (
                            tuning.capture.escape_presses_min,
                            tuning.capture.escape_presses_max,
                        );
                        let required =
                            sim.world.resource_mut::<SimRng>().0.gen_range(lo..=hi);
                        Some(Escape {
                            presses: 0,
                            required,
                            prev_crouch: false,
                            prev_sprint: false,
                        })
                    } else {
                        None
                    };
                    if let Some(mut capture) = sim.world.get_mut::<CaptureState>(entity)
                    {
                        capture.captured = Some(Captured {
                            entity: target,
                            id: target_id,
                            mouth_age: 0,
                            escape,
                        });
                    }
                    if let Some(mut vis) = sim.world.get_mut::<Visibility>(target) {
                        vis.hidden = true;
                        vis.invulnerable = true;
                    }
                }
            }
            if let Some(holder) = holder_id {
                if let Some(holder_entity) = registry::find_by_id(&mut sim.world, holder)
                {
                    if let Some(mut carry) = sim.world.get_mut::<CarryState>(entity) {
                        *carry = CarryState::Held {
                            holder: holder_entity,
                            holder_id: holder,
                        };
                    }
                }
            }
        }

        registry::rebuild_registry(&mut sim.world);
        info!(tick = save.tick, companions = save.companions.len(), "world restored");
        sim
    }
}
