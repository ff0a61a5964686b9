//! Demo Driver
//!
//! Runs a small scripted scene: a player, a befriended companion, and a
//! couple of hostiles. The driver stands in for a real host: it applies
//! locomotion orders with a naive walk, prints domain events, and can
//! write an event log and a save file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use bevy_ecs::prelude::Entity;
use clap::Parser;
use glam::Vec3;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ally_core::components::{Footprint, Look, Position, Velocity};
use ally_core::nav::LocomotionOrder;
use ally_core::{AllyInput, Simulation, Tuning};

#[derive(Parser, Debug)]
#[command(name = "ally_sim", about = "Companion behavior core demo")]
struct Args {
    /// RNG seed; identical seeds and inputs replay identically.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Optional tuning TOML.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write domain events as JSON lines.
    #[arg(long)]
    events_out: Option<PathBuf>,

    /// Write the final world save as JSON.
    #[arg(long)]
    save_out: Option<PathBuf>,
}

/// Stand-in for the host's pathfinding: walk straight at the target.
#[derive(Default)]
struct NaiveWalker {
    routes: HashMap<Entity, (Vec3, f32)>,
}

impl NaiveWalker {
    fn absorb(&mut self, orders: Vec<LocomotionOrder>, sim: &mut Simulation) {
        for order in orders {
            match order {
                LocomotionOrder::NavigateTo {
                    entity,
                    target,
                    speed,
                } => {
                    self.routes.insert(entity, (target, speed));
                }
                LocomotionOrder::Stop { entity } => {
                    self.routes.remove(&entity);
                    if let Some(mut vel) =
                        sim.world_mut().get_mut::<Velocity>(entity)
                    {
                        vel.0.x = 0.0;
                        vel.0.z = 0.0;
                    }
                }
                LocomotionOrder::LookAt { entity, target } => {
                    let at = sim
                        .world()
                        .get::<Position>(entity)
                        .map(|p| p.0)
                        .unwrap_or_default();
                    if let Some(mut look) = sim.world_mut().get_mut::<Look>(entity) {
                        look.0 = (target - at).normalize_or_zero();
                    }
                }
            }
        }
    }

    fn step(&mut self, sim: &mut Simulation) {
        let mut arrived = Vec::new();
        for (&entity, &(target, speed)) in &self.routes {
            let Some(pos) = sim.world().get::<Position>(entity).map(|p| p.0) else {
                arrived.push(entity);
                continue;
            };
            let to = Vec3::new(target.x - pos.x, 0.0, target.z - pos.z);
            if to.length() < 0.5 {
                arrived.push(entity);
                continue;
            }
            let dir = to.normalize_or_zero();
            if let Some(mut vel) = sim.world_mut().get_mut::<Velocity>(entity) {
                vel.0.x = dir.x * speed;
                vel.0.z = dir.z * speed;
            }
        }
        for entity in arrived {
            self.routes.remove(&entity);
            if let Some(mut vel) = sim.world_mut().get_mut::<Velocity>(entity) {
                vel.0.x = 0.0;
                vel.0.z = 0.0;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let tuning = match &args.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };

    let mut sim = Simulation::new(args.seed, tuning);

    let player = sim.spawn_player(Vec3::new(0.0, 0.0, 0.0));
    let companion = sim.spawn_companion(Vec3::new(2.0, 0.0, 0.0), Some(player));
    sim.spawn_mob(Vec3::new(6.0, 0.0, 2.0), Footprint::new(0.6, 0.7), 8.0, true);
    sim.spawn_mob(Vec3::new(-8.0, 0.0, 4.0), Footprint::new(0.6, 0.7), 8.0, true);
    info!(%player, %companion, "scene ready");

    // exercise the command cycle partway through the run
    let cycle_at = args.ticks / 3;

    let mut events_out = match &args.events_out {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let mut walker = NaiveWalker::default();
    for tick in 0..args.ticks {
        if tick == cycle_at {
            sim.queue_input(AllyInput::CycleCommand { creature: companion });
        }
        walker.step(&mut sim);
        sim.tick();

        let orders = sim.drain_locomotion();
        walker.absorb(orders, &mut sim);

        for event in sim.drain_events() {
            info!(tick = event.tick, event = ?event.event, "event");
            if let Some(out) = events_out.as_mut() {
                serde_json::to_writer(&mut *out, &event)?;
                out.write_all(b"\n")?;
            }
        }
        for effect in sim.drain_side_effects() {
            debug!(?effect, "side effect");
        }
        for update in sim.drain_mirror() {
            debug!(creature = %update.creature, fields = update.fields.len(), "mirror");
        }
    }

    if let Some(out) = events_out.as_mut() {
        out.flush()?;
    }

    if let Some(path) = &args.save_out {
        let save = sim.save();
        ally_core::persist::write_save(path, &save)?;
        info!(path = %path.display(), "save written");
    }

    info!(ticks = sim.tick_count(), "done");
    Ok(())
}
