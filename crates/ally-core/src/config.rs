//! Configuration System
//!
//! Loads tuning parameters from a TOML file so the behavior constants can
//! be adjusted without recompiling. Every field has a default matching
//! the reference behavior; a missing section or file yields the defaults.

use bevy_ecs::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a tuning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level tuning resource.
#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub inhale: InhaleTuning,
    pub capture: CaptureTuning,
    pub carry: CarryTuning,
    pub lives: LivesTuning,
    pub command: CommandTuning,
    pub flight: FlightTuning,
}

impl Tuning {
    /// Loads tuning from a TOML file, falling back to defaults for any
    /// absent section.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

/// Inhale attack parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InhaleTuning {
    /// Pull range in world units.
    pub range: f32,
    /// Targets inside this range transition to captured.
    pub mouth_range: f32,
    /// Base pull impulse, scaled down with distance.
    pub pull_strength: f32,
    /// Forward-cone test: dot(look, to_target) must exceed this.
    pub cone_dot: f32,
    /// Ticks of fruitless inhaling before auto-cancel.
    pub timeout_ticks: u32,
    /// Largest capturable bounding box (width).
    pub max_target_width: f32,
    /// Largest capturable bounding box (height).
    pub max_target_height: f32,
}

impl Default for InhaleTuning {
    fn default() -> Self {
        Self {
            range: 3.0,
            mouth_range: 1.0,
            pull_strength: 0.15,
            cone_dot: 0.5,
            timeout_ticks: 100,
            max_target_width: 0.9,
            max_target_height: 1.8,
        }
    }
}

/// Captured-target handling parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureTuning {
    /// Damage applied by the periodic mouth pulse.
    pub mouth_damage: f32,
    /// Ticks between mouth-damage pulses.
    pub mouth_damage_interval: u32,
    /// Health ratio below which a non-player target may be expelled.
    pub expel_health_ratio: f32,
    /// Per-tick Bernoulli probability of expulsion.
    pub expel_chance: f64,
    /// Horizontal speed cap on the expulsion impulse.
    pub expel_speed: f32,
    /// Upward bias added to the expulsion impulse.
    pub expel_lift: f32,
    /// Radius scanned for hostiles that justify spitting.
    pub spit_scan_radius: f32,
    /// Star projectile damage.
    pub star_damage: f32,
    /// Star projectile knockback strength.
    pub star_knockback: f32,
    /// Star projectile launch speed.
    pub star_speed: f32,
    /// Ticks the spit face lingers after firing a star.
    pub spit_face_ticks: u32,
    /// Inclusive range the per-capture escape threshold is drawn from.
    pub escape_presses_min: u32,
    pub escape_presses_max: u32,
    /// Ticks of post-escape pushback with locomotion disabled.
    pub pushback_ticks: u32,
}

impl Default for CaptureTuning {
    fn default() -> Self {
        Self {
            mouth_damage: 2.0,
            mouth_damage_interval: 20,
            expel_health_ratio: 0.3,
            expel_chance: 0.05,
            expel_speed: 0.3,
            expel_lift: 0.25,
            spit_scan_radius: 5.0,
            star_damage: 6.0,
            star_knockback: 1.5,
            star_speed: 1.5,
            spit_face_ticks: 15,
            escape_presses_min: 10,
            escape_presses_max: 15,
            pushback_ticks: 12,
        }
    }
}

/// Carry/throw kinematics parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarryTuning {
    /// Vertical offset of the hold position above the holder.
    pub hold_up: f32,
    /// Forward offset along the holder's look direction.
    pub hold_forward: f32,
    /// Lateral offset along the holder's right vector.
    pub hold_lateral: f32,
    /// Launch speed along the holder's look direction.
    pub throw_speed: f32,
    /// Ticks a thrown creature may fly before settling.
    pub thrown_max_age: u32,
    /// Damage dealt to an entity struck in flight.
    pub hit_damage: f32,
    /// Self-damage taken on an in-flight collision.
    pub self_damage: f32,
}

impl Default for CarryTuning {
    fn default() -> Self {
        Self {
            hold_up: 0.4,
            hold_forward: 0.6,
            hold_lateral: 0.3,
            throw_speed: 1.2,
            thrown_max_age: 40,
            hit_damage: 6.0,
            self_damage: 2.0,
        }
    }
}

/// Lives and respawn parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LivesTuning {
    /// Lives a fresh companion starts with.
    pub starting_lives: u32,
    /// Respawn countdown after a life is consumed.
    pub respawn_ticks: u32,
    /// Health the creature is masked to while waiting to respawn.
    pub masked_health: f32,
}

impl Default for LivesTuning {
    fn default() -> Self {
        Self {
            starting_lives: ally_events::DEFAULT_LIVES,
            respawn_ticks: 3600,
            masked_health: 1.0,
        }
    }
}

/// Generic command-behavior parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandTuning {
    /// Follow starts at this distance from the owner.
    pub follow_start: f32,
    /// Advisory walk speed for follow navigation, world units per tick.
    pub follow_speed: f32,
    /// Advisory walk speed for patrol/wander navigation.
    pub roam_speed: f32,
    /// Follow stops once within this distance.
    pub follow_stop: f32,
    /// Ticks between follow path recalculations.
    pub follow_repath_ticks: u32,
    /// Beyond this distance the ally teleports to the owner.
    pub follow_teleport_distance: f32,
    /// Offset attempts per teleport.
    pub teleport_attempts: u32,
    /// Patrol roam radius around the anchored center.
    pub patrol_radius: f32,
    /// Patrol waypoint cooldown, drawn uniformly from this range.
    pub patrol_cooldown_min: u32,
    pub patrol_cooldown_max: u32,
    /// Placement attempts per patrol waypoint.
    pub patrol_attempts: u32,
    /// Vertical scan range when validating patrol ground.
    pub patrol_ground_scan: i32,
    /// Wander roam radius.
    pub wander_radius: f32,
}

impl Default for CommandTuning {
    fn default() -> Self {
        Self {
            follow_start: 10.0,
            follow_speed: 0.3,
            roam_speed: 0.2,
            follow_stop: 2.0,
            follow_repath_ticks: 10,
            follow_teleport_distance: 12.0,
            teleport_attempts: 10,
            patrol_radius: 8.0,
            patrol_cooldown_min: 100,
            patrol_cooldown_max: 200,
            patrol_attempts: 10,
            patrol_ground_scan: 3,
            wander_radius: 10.0,
        }
    }
}

/// Flying (puffed-up) parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    /// Ticks between arm flaps.
    pub flap_interval: u32,
    /// Upward boost per flap.
    pub flap_boost: f32,
    /// Multiplier applied to downward velocity while flying.
    pub fall_damping: f32,
    /// Air-bullet launch speed on exhale.
    pub air_bullet_speed: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            flap_interval: 6,
            flap_boost: 0.15,
            fall_damping: 0.6,
            air_bullet_speed: 0.5,
        }
    }
}
