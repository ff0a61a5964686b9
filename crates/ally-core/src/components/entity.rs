//! Shared Entity Components
//!
//! Components carried by every living entity the core simulates:
//! identity, placement, vitals, and the flags other systems observe.

use bevy_ecs::prelude::*;
use glam::Vec3;
use uuid::Uuid;

/// Stable identity that survives save/load. Live [`Entity`] handles are
/// transient and never persisted.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StableId(pub Uuid);

impl StableId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// World position.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Position(pub Vec3);

/// Per-tick velocity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec3);

/// Unit look direction.
#[derive(Component, Debug, Clone, Copy)]
pub struct Look(pub Vec3);

impl Default for Look {
    fn default() -> Self {
        Self(Vec3::Z)
    }
}

impl Look {
    /// Horizontal (y-flattened) look direction, normalized.
    pub fn horizontal(&self) -> Vec3 {
        let flat = Vec3::new(self.0.x, 0.0, self.0.z);
        flat.normalize_or_zero()
    }
}

/// Health and liveness.
#[derive(Component, Debug, Clone, Copy)]
pub struct Vitals {
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
}

impl Vitals {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            alive: true,
        }
    }

    pub fn ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}

/// Axis-aligned bounding box dimensions (width applies to both horizontal
/// axes).
#[derive(Component, Debug, Clone, Copy)]
pub struct Footprint {
    pub width: f32,
    pub height: f32,
}

impl Footprint {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Bounding-volume overlap test between two footprinted entities.
pub fn aabb_overlap(pos_a: Vec3, fp_a: Footprint, pos_b: Vec3, fp_b: Footprint) -> bool {
    let half = (fp_a.width + fp_b.width) * 0.5;
    (pos_a.x - pos_b.x).abs() <= half
        && (pos_a.z - pos_b.z).abs() <= half
        && pos_a.y <= pos_b.y + fp_b.height
        && pos_b.y <= pos_a.y + fp_a.height
}

/// Render/damage gating flags mirrored from the authoritative side.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Visibility {
    pub hidden: bool,
    pub invulnerable: bool,
}

/// Posture flags for player-controlled entities. Toggles of either flag
/// while captured count toward the escape counter.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerFlags {
    pub crouching: bool,
    pub sprinting: bool,
}

/// Hostility descriptor for mobs.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Menace {
    /// Intrinsically hostile regardless of current target.
    pub monster: bool,
    /// Stable id of the entity this mob is currently targeting.
    pub target: Option<Uuid>,
}
