//! Core controller systems.
//!
//! These systems run the charge jump controller for every actor. They are
//! generic over the physics backend so that different physics engines can be
//! used.

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::charge::{DirectionBias, JumpCharge};
use crate::config::ControllerConfig;
use crate::controller::{step_movement, ChargeJumpController, MovementFrame, MovementState};
use crate::input::InputSample;
use crate::locomotion::Facing;
use crate::sensor::GroundSensor;
use crate::state::{ControllerDisabled, MovementLock};
use crate::stuck::{find_recovery_target, PositionOverridden, StuckTracker};
use crate::surface::SurfaceContact;
use crate::trajectory::TrajectoryPreview;

/// Emitted when an actor launches a charged jump.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct JumpLaunched {
    pub entity: Entity,
    /// Velocity handed to the physics backend.
    pub velocity: Vec2,
    /// Force accumulated at release.
    pub force: f32,
    pub direction: DirectionBias,
}

/// Marks actors that passed validation.
#[derive(Component)]
pub(crate) struct ControllerValidated;

/// Monotonic elapsed time and tick duration, with a fallback for tests.
fn clock(world: &World) -> (f32, f32) {
    world
        .get_resource::<Time>()
        .map(|t| (t.elapsed_secs(), t.delta_secs()))
        .unwrap_or((0.0, 1.0 / 60.0))
}

/// Validate newly added controllers.
///
/// Actors with an invalid config or missing backend collaborators get
/// [`ControllerDisabled`] and are skipped from then on.
pub fn validate_controllers<B: CharacterPhysicsBackend>(world: &mut World) {
    let pending: Vec<(Entity, ControllerConfig)> = world
        .query_filtered::<(Entity, &ControllerConfig), (
            With<ChargeJumpController>,
            Without<ControllerValidated>,
            Without<ControllerDisabled>,
        )>()
        .iter(world)
        .map(|(e, config)| (e, *config))
        .collect();

    for (entity, config) in pending {
        let result = config
            .validate()
            .and_then(|()| B::validate_velocity(world, entity))
            .and_then(|()| B::validate_actor(world, entity));

        match result {
            Ok(()) => {
                world.entity_mut(entity).insert(ControllerValidated);
            }
            Err(err) => {
                error!("Disabling charge jump controller on {entity}: {err}");
                world.entity_mut(entity).insert(ControllerDisabled {
                    reason: err.to_string(),
                });
            }
        }
    }
}

/// Cancel charges and cooldowns when a movement lock is applied.
pub fn cancel_locked_charges(
    mut q_locked: Query<(&mut JumpCharge, &mut TrajectoryPreview), Added<MovementLock>>,
) {
    for (mut charge, mut preview) in &mut q_locked {
        charge.cancel();
        preview.hide();
    }
}

/// Run the charge, preview and locomotion step for every active actor.
pub fn run_movement_controllers<B: CharacterPhysicsBackend>(world: &mut World) {
    let (now, dt) = clock(world);

    let entities: Vec<(Entity, ControllerConfig, InputSample, GroundSensor, bool)> = world
        .query_filtered::<(
            Entity,
            &ControllerConfig,
            &InputSample,
            &GroundSensor,
            &SurfaceContact,
        ), (
            With<ControllerValidated>,
            Without<ControllerDisabled>,
            Without<MovementLock>,
        )>()
        .iter(world)
        .map(|(e, config, input, sensor, surface)| {
            (
                e,
                *config,
                *input,
                *sensor,
                surface.on_slippery_surface,
            )
        })
        .collect();

    let mut q_state = world.query::<(&mut JumpCharge, &mut TrajectoryPreview, &mut Facing)>();

    for (entity, config, input, sensor, on_slippery_surface) in entities {
        let frame = MovementFrame {
            input,
            grounded: sensor.grounded,
            landed: sensor.just_landed(),
            on_slippery_surface,
            position: B::get_position(world, entity),
            velocity: B::get_velocity(world, entity),
            dt,
            now,
        };

        let Ok((mut charge, mut preview, mut facing)) = q_state.get_mut(world, entity) else {
            continue;
        };

        let mut next_charge = *charge;
        let mut next_facing = *facing;
        let output = step_movement(
            MovementState {
                charge: &mut next_charge,
                preview: &mut *preview,
                facing: &mut next_facing,
            },
            &config,
            &frame,
        );
        charge.set_if_neq(next_charge);
        facing.set_if_neq(next_facing);

        if let Some(velocity) = output.velocity {
            B::set_velocity(world, entity, velocity);
        }

        if let Some(launch) = output.launch {
            debug!(
                "{entity} launched with force {:.2} ({:?})",
                launch.force, launch.direction
            );
            world.send_event(JumpLaunched {
                entity,
                velocity: launch.velocity,
                force: launch.force,
                direction: launch.direction,
            });
        }
    }
}

/// Teleport actors that stayed airborne and stationary for too long.
///
/// The actor lands on top of the nearest collider. When there is none the
/// actor stays where it is; the stuck timer has already restarted.
pub fn recover_stuck_actors<B: CharacterPhysicsBackend>(world: &mut World) {
    let (_, dt) = clock(world);

    let entities: Vec<(Entity, ControllerConfig, bool, StuckTracker)> = world
        .query_filtered::<(Entity, &ControllerConfig, &GroundSensor, &StuckTracker), (
            With<ControllerValidated>,
            Without<ControllerDisabled>,
            Without<MovementLock>,
        )>()
        .iter(world)
        .map(|(e, config, sensor, tracker)| (e, *config, sensor.grounded, *tracker))
        .collect();

    for (entity, config, grounded, mut tracker) in entities {
        let position = B::get_position(world, entity);

        if tracker.update(position, grounded, dt, &config) {
            let half_height = B::collider_half_extents(world, entity)
                .map(|extents| extents.y)
                .unwrap_or(0.0);
            let anchors = B::collider_bounds(world, entity);

            match find_recovery_target(entity, position, half_height, &anchors) {
                Some((anchor, target)) => {
                    B::set_position(world, entity, target);
                    tracker.teleported(target);
                    debug!("{entity} was stuck at {position}; moved onto {anchor} at {target}");
                    world.send_event(PositionOverridden {
                        entity,
                        from: position,
                        to: target,
                    });
                }
                None => {
                    debug!("{entity} is stuck at {position} but no collider can take it");
                }
            }
        }

        if let Some(mut stored) = world.get_mut::<StuckTracker>(entity) {
            *stored = tracker;
        }
    }
}
