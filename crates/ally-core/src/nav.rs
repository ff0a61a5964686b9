//! Navigation and Side-Effect Seams
//!
//! The core never walks terrain or spawns projectiles itself. Terrain
//! questions go through the [`NavOracle`] trait and movement intents and
//! one-shot effects accumulate in buffered resources the host drains
//! after each tick.

use bevy_ecs::prelude::*;
use glam::{IVec3, Vec3};
use uuid::Uuid;

/// Terrain queries the host answers.
///
/// All answers are advisory; the core clamps and validates positions it
/// derives from them but never assumes collision resolution.
pub trait NavOracle: Send + Sync {
    /// True if an entity of the given footprint can stand at `pos`.
    fn is_walkable(&self, pos: Vec3, width: f32, height: f32) -> bool;

    /// True if the straight segment from `from` to `to` is passable for
    /// the given footprint.
    fn has_collision_free(&self, from: Vec3, to: Vec3, width: f32, height: f32) -> bool;

    /// Ground height at the given column, if any exists near `y`.
    fn ground_height(&self, x: f32, z: f32, near_y: f32) -> Option<f32>;
}

/// Default oracle: an unbounded flat plane at y = 0.
pub struct OpenField;

impl NavOracle for OpenField {
    fn is_walkable(&self, pos: Vec3, _width: f32, _height: f32) -> bool {
        pos.y >= 0.0
    }

    fn has_collision_free(&self, _from: Vec3, _to: Vec3, _width: f32, _height: f32) -> bool {
        true
    }

    fn ground_height(&self, _x: f32, _z: f32, _near_y: f32) -> Option<f32> {
        Some(0.0)
    }
}

/// Boxed oracle resource.
#[derive(Resource)]
pub struct Navigation(pub Box<dyn NavOracle>);

impl Default for Navigation {
    fn default() -> Self {
        Self(Box::new(OpenField))
    }
}

/// A movement intent for the host's locomotion layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocomotionOrder {
    /// Walk toward `target` at `speed` world units per tick.
    NavigateTo {
        entity: Entity,
        target: Vec3,
        speed: f32,
    },
    /// Stop any in-progress navigation.
    Stop { entity: Entity },
    /// Face toward `target` without moving.
    LookAt { entity: Entity, target: Vec3 },
}

/// Buffered locomotion intents, drained by the host each tick.
#[derive(Resource, Debug, Default)]
pub struct LocomotionQueue {
    orders: Vec<LocomotionOrder>,
}

impl LocomotionQueue {
    pub fn push(&mut self, order: LocomotionOrder) {
        self.orders.push(order);
    }

    pub fn drain(&mut self) -> Vec<LocomotionOrder> {
        std::mem::take(&mut self.orders)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocomotionOrder> {
        self.orders.iter()
    }
}

/// Sound cues the presentation side may play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    InhaleStart,
    Flap,
    Swallow,
    Spit,
    Escape,
    Throw,
    LifeLost,
    Respawn,
}

/// Projectile families the core can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Spat star carrying the converted target's mass.
    Star,
    /// Air puff released when flight ends.
    AirBullet,
}

/// A projectile spawn request. The host owns the projectile's flight;
/// damage and knockback here describe what it should do on impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpec {
    pub kind: ProjectileKind,
    pub shooter: Uuid,
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub knockback: f32,
}

/// One-shot presentational effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SideEffect {
    Sound { at: Vec3, cue: SoundCue },
    Particles { at: Vec3 },
    Projectile(ProjectileSpec),
}

/// Buffered side effects, drained by the host each tick.
#[derive(Resource, Debug, Default)]
pub struct SideEffects {
    effects: Vec<SideEffect>,
}

impl SideEffects {
    pub fn push(&mut self, effect: SideEffect) {
        self.effects.push(effect);
    }

    pub fn drain(&mut self) -> Vec<SideEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SideEffect> {
        self.effects.iter()
    }
}

/// Snaps a candidate point down onto walkable ground, scanning a few
/// columns up and down from the starting height.
pub fn snap_to_ground(
    nav: &dyn NavOracle,
    candidate: Vec3,
    width: f32,
    height: f32,
    scan: i32,
) -> Option<Vec3> {
    for dy in -scan..=scan {
        let y = candidate.y + dy as f32;
        if let Some(ground) = nav.ground_height(candidate.x, candidate.z, y) {
            let snapped = Vec3::new(candidate.x, ground, candidate.z);
            if nav.is_walkable(snapped, width, height) {
                return Some(snapped);
            }
        }
    }
    None
}

/// Integer block position of a world point.
pub fn block_of(pos: Vec3) -> IVec3 {
    IVec3::new(
        pos.x.floor() as i32,
        pos.y.floor() as i32,
        pos.z.floor() as i32,
    )
}
