//! Tick Systems
//!
//! The fixed per-tick pipeline stages. Ordering is load-bearing and is
//! declared once, in the simulation schedule.

pub mod capture;
pub mod carry;
pub mod face;
pub mod flight;
pub mod lives;
pub mod mirror;
pub mod motion;

pub use capture::{tick_capture, tick_inhale};
pub use carry::tick_carry;
pub use face::derive_faces;
pub use flight::tick_flight;
pub use lives::tick_lives;
pub use mirror::{emit_mirror, MirrorCache, MirrorFeed};
pub use motion::{apply_effects, integrate_motion, TargetEffect, TargetEffects};
