//! Controller configuration components.
//!
//! This module defines the tuning parameters for charge jump controllers:
//! walking speed, the jump force range and charge rate, the jump cooldown,
//! ground sensing, trajectory preview resolution, and stuck recovery
//! thresholds. It also holds the key bindings used by the keyboard sampler.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

/// Tuning parameters for a charge jump controller.
///
/// All distances are in world units and all durations in seconds.
///
/// # Example
///
/// ```rust
/// use charge_jump_controller::prelude::*;
///
/// let config = ControllerConfig::player()
///     .with_move_speed(7.0)
///     .with_jump_force(1.0, 12.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct ControllerConfig {
    // === Locomotion ===
    /// Horizontal speed at full axis input.
    pub move_speed: f32,

    // === Jump Charge ===
    /// Force applied when the charge starts.
    pub min_jump_force: f32,
    /// Upper bound of the accumulated force.
    pub max_jump_force: f32,
    /// Force gained per second of charging.
    pub charge_rate: f32,
    /// Share of the charged force that becomes horizontal launch speed.
    pub horizontal_force_fraction: f32,
    /// Time after a launch before a new charge may start.
    pub jump_cooldown: f32,

    // === Ground Sensor ===
    /// How far below the collider bounds the ground box cast reaches.
    pub ground_cast_distance: f32,
    /// Collision group bits considered ground by the box cast.
    pub ground_groups: u32,

    // === Trajectory Preview ===
    /// Number of points in the trajectory preview.
    pub trajectory_resolution: usize,
    /// Gravity used for the preview arc. Should match the physics engine.
    pub gravity: Vec2,

    // === Stuck Recovery ===
    /// Per-frame displacement below which the actor counts as stationary.
    pub min_motion: f32,
    /// Time spent airborne and stationary before recovery kicks in.
    pub stuck_threshold: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            min_jump_force: 0.5,
            max_jump_force: 10.0,
            charge_rate: 0.5,
            horizontal_force_fraction: 0.5,
            jump_cooldown: 0.5,
            ground_cast_distance: 0.1,
            ground_groups: u32::MAX,
            trajectory_resolution: 100,
            gravity: Vec2::new(0.0, -9.81),
            min_motion: 0.01,
            stuck_threshold: 4.0,
        }
    }
}

impl ControllerConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for a player character: fast charge, full-height jumps.
    pub fn player() -> Self {
        Self {
            charge_rate: 12.0,
            max_jump_force: 12.0,
            ..default()
        }
    }

    /// Parse a config from TOML and validate it.
    ///
    /// Missing keys fall back to [`ControllerConfig::default`].
    pub fn from_toml_str(source: &str) -> Result<Self, ControllerError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the controller.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(self.min_jump_force.is_finite() && self.max_jump_force.is_finite())
            || self.min_jump_force > self.max_jump_force
        {
            return Err(ControllerError::InvalidForceRange {
                min: self.min_jump_force,
                max: self.max_jump_force,
            });
        }
        if !self.ground_cast_distance.is_finite() || self.ground_cast_distance <= 0.0 {
            return Err(ControllerError::NonPositive {
                name: "ground_cast_distance",
                value: self.ground_cast_distance,
            });
        }
        if !self.stuck_threshold.is_finite() || self.stuck_threshold <= 0.0 {
            return Err(ControllerError::NonPositive {
                name: "stuck_threshold",
                value: self.stuck_threshold,
            });
        }
        for (name, value) in [
            ("move_speed", self.move_speed),
            ("charge_rate", self.charge_rate),
            ("jump_cooldown", self.jump_cooldown),
            ("horizontal_force_fraction", self.horizontal_force_fraction),
            ("min_motion", self.min_motion),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ControllerError::Negative { name, value });
            }
        }
        if !self.gravity.is_finite() {
            return Err(ControllerError::NonFiniteGravity(self.gravity));
        }
        if self.trajectory_resolution == 0 {
            return Err(ControllerError::EmptyTrajectory);
        }
        Ok(())
    }

    /// Builder: set the walking speed.
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Builder: set the jump force range.
    pub fn with_jump_force(mut self, min: f32, max: f32) -> Self {
        self.min_jump_force = min;
        self.max_jump_force = max;
        self
    }

    /// Builder: set the force gained per second of charging.
    pub fn with_charge_rate(mut self, rate: f32) -> Self {
        self.charge_rate = rate;
        self
    }

    /// Builder: set the horizontal share of the launch force.
    pub fn with_horizontal_force_fraction(mut self, fraction: f32) -> Self {
        self.horizontal_force_fraction = fraction;
        self
    }

    /// Builder: set the jump cooldown.
    pub fn with_jump_cooldown(mut self, seconds: f32) -> Self {
        self.jump_cooldown = seconds;
        self
    }

    /// Builder: set the ground cast distance.
    pub fn with_ground_cast_distance(mut self, distance: f32) -> Self {
        self.ground_cast_distance = distance;
        self
    }

    /// Builder: set the collision groups treated as ground.
    pub fn with_ground_groups(mut self, groups: u32) -> Self {
        self.ground_groups = groups;
        self
    }

    /// Builder: set the number of trajectory preview points.
    pub fn with_trajectory_resolution(mut self, samples: usize) -> Self {
        self.trajectory_resolution = samples;
        self
    }

    /// Builder: set the preview gravity.
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set the stuck detection thresholds.
    pub fn with_stuck_detection(mut self, min_motion: f32, threshold: f32) -> Self {
        self.min_motion = min_motion;
        self.stuck_threshold = threshold;
        self
    }
}

/// Key bindings read by the keyboard input sampler.
///
/// Any of the listed keys counts for its action.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct KeyBindings {
    /// Keys that charge (hold) and launch (release) a jump.
    pub charge: Vec<KeyCode>,
    /// Keys that steer left.
    pub left: Vec<KeyCode>,
    /// Keys that steer right.
    pub right: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            charge: vec![KeyCode::Space],
            left: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            right: vec![KeyCode::KeyD, KeyCode::ArrowRight],
        }
    }
}
