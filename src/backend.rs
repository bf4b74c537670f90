//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the charge jump controller. The controller never talks to a
//! physics engine directly: it reads and writes velocity and position
//! through the backend, asks it for collider bounds during stuck recovery,
//! and relies on its plugin to run the ground sensor and to report surface
//! contacts.

use bevy::ecs::intern::Interned;
use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

use crate::collision::ColliderBounds;
use crate::error::ControllerError;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the controller.
/// The backend plugin is expected to:
/// - run a system in [`ChargeJumpSet::Sensors`](crate::ChargeJumpSet::Sensors)
///   that executes [`BoxCastRequest::ground`](crate::sensor::BoxCastRequest::ground)
///   for every actor and stores the result with
///   [`GroundSensor::record`](crate::sensor::GroundSensor::record);
/// - write [`SurfaceContactEvent`](crate::surface::SurfaceContactEvent)s
///   when an actor starts or stops touching a collider tagged with
///   [`SurfaceKind`](crate::surface::SurfaceKind).
///
/// For an example implementation, see the `rapier` module's `Rapier2dBackend`.
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// The velocity component type used by this backend.
    type VelocityComponent: Component;

    /// Returns the plugin that sets up this backend.
    ///
    /// `schedule` is the schedule the controller runs in; backend systems
    /// must be added there so the set ordering applies.
    fn plugin(schedule: Interned<dyn ScheduleLabel>) -> impl Plugin;

    /// Check that an actor carries [`Self::VelocityComponent`].
    fn validate_velocity(world: &World, entity: Entity) -> Result<(), ControllerError> {
        if world.get::<Self::VelocityComponent>(entity).is_none() {
            return Err(ControllerError::MissingCollaborator {
                entity,
                collaborator: std::any::type_name::<Self::VelocityComponent>(),
            });
        }
        Ok(())
    }

    /// Check that an actor has everything else the backend needs.
    fn validate_actor(world: &World, entity: Entity) -> Result<(), ControllerError>;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Get the current position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec2;

    /// Move an entity without changing its velocity.
    fn set_position(world: &mut World, entity: Entity, position: Vec2);

    /// Half size of the entity's collider bounds.
    fn collider_half_extents(world: &World, entity: Entity) -> Option<Vec2>;

    /// Bounds of every collider in the world except `exclude`'s own.
    fn collider_bounds(world: &mut World, exclude: Entity) -> Vec<ColliderBounds>;
}

