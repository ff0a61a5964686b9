//! ECS Components
//!
//! Components for living entities and the companion creature's sub-states.

pub mod companion;
pub mod entity;

pub use companion::{
    movement_locked, AllyOrder, CaptureState, Captured, CarryState, Companion,
    CompanionTimers, Escape, Face, FaceState, HealthTier, OwnedBy, PatrolAnchor,
};
pub use entity::{
    aabb_overlap, Footprint, Look, Menace, PlayerFlags, Position, StableId,
    Velocity, Visibility, Vitals,
};
