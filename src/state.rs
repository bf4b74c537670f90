//! State marker components.
//!
//! [`Grounded`], [`Airborne`] and [`Charging`] are added and removed by the
//! controller systems so gameplay code can filter queries on them.
//! [`MovementLock`] and [`ControllerDisabled`] are inputs to the controller.

use bevy::prelude::*;

use crate::charge::JumpCharge;
use crate::sensor::GroundSensor;

/// Marker component indicating the character is grounded.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use charge_jump_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating a jump is being charged.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Charging;

/// Suspends the controller for this actor.
///
/// Insert it on the player entity while a dialog or cutscene owns the
/// screen, and remove it afterwards. Any charge or cooldown in progress is
/// cancelled when the lock is applied.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct MovementLock;

/// The controller refused to run for this actor.
///
/// Added when validation fails; the reason is the error message.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct ControllerDisabled {
    pub reason: String,
}

/// Sync state marker components with the sensor and charge state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &GroundSensor,
        &JumpCharge,
        Has<Grounded>,
        Has<Airborne>,
        Has<Charging>,
    )>,
) {
    for (entity, sensor, charge, has_grounded, has_airborne, has_charging) in &q_controllers {
        // Sync Grounded/Airborne
        if sensor.grounded && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !sensor.grounded && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        // Sync Charging
        if charge.is_charging() && !has_charging {
            commands.entity(entity).insert(Charging);
        } else if !charge.is_charging() && has_charging {
            commands.entity(entity).remove::<Charging>();
        }
    }
}
