//! The per-tick movement step.
//!
//! [`step_movement`] runs the charge state machine, the trajectory preview
//! and locomotion for one actor, in that order. It only touches the actor's
//! own components and returns what the physics backend has to apply, so it
//! can be driven without an ECS world.

use bevy::prelude::*;

use crate::charge::{JumpCharge, Launch};
use crate::config::ControllerConfig;
use crate::input::InputSample;
use crate::locomotion::{apply_locomotion, Facing};
use crate::trajectory::{compute_preview, TrajectoryPreview};

/// Marker and entry point for a charge jump controlled actor.
///
/// Pulls in every state component the controller systems need.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use charge_jump_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         ChargeJumpController,
///         ControllerConfig::player(),
///         KeyboardControlled,
///     ));
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
#[require(
    ControllerConfig,
    InputSample,
    crate::sensor::GroundSensor,
    crate::surface::SurfaceContact,
    JumpCharge,
    TrajectoryPreview,
    crate::stuck::StuckTracker,
    Facing
)]
pub struct ChargeJumpController;

/// Everything the movement step reads for one tick.
#[derive(Debug, Clone, Copy)]
pub struct MovementFrame {
    /// This tick's input.
    pub input: InputSample,
    /// Ground sensor result for this tick.
    pub grounded: bool,
    /// First grounded tick after being airborne.
    pub landed: bool,
    /// Standing on a slippery surface.
    pub on_slippery_surface: bool,
    /// Actor position.
    pub position: Vec2,
    /// Actor velocity before the step.
    pub velocity: Vec2,
    /// Tick duration in seconds.
    pub dt: f32,
    /// Monotonic elapsed time in seconds.
    pub now: f32,
}

/// What the movement step asks of the physics backend.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementOutput {
    /// Velocity to set, if the step overrides it.
    pub velocity: Option<Vec2>,
    /// The launch performed this tick, if any.
    pub launch: Option<Launch>,
}

/// Mutable per-actor state touched by the movement step.
pub struct MovementState<'a> {
    pub charge: &'a mut JumpCharge,
    pub preview: &'a mut TrajectoryPreview,
    pub facing: &'a mut Facing,
}

/// Run one tick of charge, preview and locomotion logic.
pub fn step_movement(
    state: MovementState<'_>,
    config: &ControllerConfig,
    frame: &MovementFrame,
) -> MovementOutput {
    let MovementState {
        charge,
        preview,
        facing,
    } = state;
    let mut output = MovementOutput::default();

    if charge.update_cooldown(frame.now) {
        debug!("Jump cooldown elapsed at {:.2}s", frame.now);
    }

    // Touching down drops a charge that was never released on the ground
    if frame.landed && charge.is_charging() {
        charge.reset();
        preview.hide();
    }

    let eligible = frame.grounded && !charge.is_cooling_down(frame.now);
    if eligible {
        let input = &frame.input;
        let entered = input.charge_held && charge.start(frame.now);

        if input.charge_released {
            if let Some(launch) = charge.launch(frame.now, config) {
                output.velocity = Some(launch.velocity);
                output.launch = Some(launch);
                preview.hide();
            }
        }

        if charge.is_charging() {
            // The entry tick starts at the minimum force
            if !entered {
                charge.charge(frame.dt, config);
            }
            charge.steer(input.left_held, input.right_held);
        }
    }

    if let Some(velocity) = charge.current_launch_velocity(config) {
        preview.show(compute_preview(
            frame.position,
            velocity,
            config.gravity,
            config.trajectory_resolution,
        ));
    }

    let may_walk = eligible
        && !charge.is_charging()
        && !frame.on_slippery_surface
        && output.launch.is_none();
    if may_walk {
        let axis = frame.input.horizontal_axis;
        output.velocity = Some(apply_locomotion(axis, config.move_speed, frame.velocity));
        facing.update(axis);
    }

    // A pending cooldown survives this; only the preview is forced off
    if frame.grounded && !charge.is_charging() {
        preview.hide();
    }

    output
}
