//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.

use bevy::ecs::intern::Interned;
use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::parry::math::{Isometry, Vector};
use bevy_rapier2d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::collision::{ColliderBounds, CollisionData};
use crate::config::ControllerConfig;
use crate::controller::ChargeJumpController;
use crate::error::ControllerError;
use crate::sensor::{BoxCastRequest, GroundSensor};
use crate::state::ControllerDisabled;
use crate::surface::{ContactPhase, SurfaceContactEvent, SurfaceKind};
use crate::ChargeJumpSet;

/// Rapier2D physics backend for the charge jump controller.
///
/// Velocity is read from and written to Rapier's [`Velocity`]; positions go
/// through the [`Transform`] so that Rapier picks up teleports. Box casts and
/// collision events are handled by dedicated Rapier systems that receive
/// `RapierContext` as a system parameter.
pub struct Rapier2dBackend;

impl CharacterPhysicsBackend for Rapier2dBackend {
    type VelocityComponent = Velocity;

    fn plugin(schedule: Interned<dyn ScheduleLabel>) -> impl Plugin {
        Rapier2dBackendPlugin { schedule }
    }

    fn validate_actor(world: &World, entity: Entity) -> Result<(), ControllerError> {
        if world.get::<Collider>(entity).is_none() {
            return Err(ControllerError::MissingCollaborator {
                entity,
                collaborator: "Collider",
            });
        }
        if world.get::<Transform>(entity).is_none() {
            return Err(ControllerError::MissingCollaborator {
                entity,
                collaborator: "Transform",
            });
        }
        Ok(())
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation.xy())
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation().xy())
            })
            .unwrap_or(Vec2::ZERO)
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec2) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }

    fn collider_half_extents(world: &World, entity: Entity) -> Option<Vec2> {
        world.get::<Collider>(entity).map(collider_half_extents)
    }

    fn collider_bounds(world: &mut World, exclude: Entity) -> Vec<ColliderBounds> {
        world
            .query::<(Entity, &Collider, &GlobalTransform)>()
            .iter(world)
            .filter(|(entity, _, _)| *entity != exclude)
            .map(|(entity, collider, transform)| world_bounds(entity, collider, transform))
            .collect()
    }
}

/// Plugin that sets up Rapier2D-specific systems for the controller.
pub struct Rapier2dBackendPlugin {
    schedule: Interned<dyn ScheduleLabel>,
}

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            self.schedule,
            (rapier_ground_detection, rapier_surface_contacts).in_set(ChargeJumpSet::Sensors),
        );
    }
}

/// Half size of a collider's local bounding box.
pub fn collider_half_extents(collider: &Collider) -> Vec2 {
    let half = collider.raw.compute_local_aabb().half_extents();
    Vec2::new(half.x, half.y)
}

/// World-space bounding box of a collider.
///
/// Rotation is taken from the transform. Scale is ignored.
pub fn world_bounds(entity: Entity, collider: &Collider, transform: &GlobalTransform) -> ColliderBounds {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    let (_, _, angle) = rotation.to_euler(EulerRot::XYZ);
    let isometry = Isometry::new(Vector::new(translation.x, translation.y), angle);
    let aabb = collider.raw.compute_aabb(&isometry);
    ColliderBounds::from_min_max(
        entity,
        Vec2::new(aabb.mins.x, aabb.mins.y),
        Vec2::new(aabb.maxs.x, aabb.maxs.y),
    )
}

/// Execute a box cast using RapierContext.
fn rapier_box_cast(context: &RapierContext, request: &BoxCastRequest) -> Option<CollisionData> {
    let shape = Collider::cuboid(request.half_extents.x, request.half_extents.y);

    let mut filter = QueryFilter::default()
        .exclude_sensors()
        .groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(request.groups),
        ));
    if let Some(entity) = request.exclude {
        filter = filter.exclude_rigid_body(entity).exclude_collider(entity);
    }

    context
        .cast_shape(
            request.origin,
            0.0,
            request.direction,
            &shape,
            ShapeCastOptions {
                max_time_of_impact: request.max_distance,
                // Already touching counts as a hit
                stop_at_penetration: true,
                ..default()
            },
            filter,
        )
        .map(|(hit_entity, hit)| {
            let normal = hit.details.map(|d| d.normal1).unwrap_or(-request.direction);
            let point = request.origin + request.direction * hit.time_of_impact;
            CollisionData::new(hit.time_of_impact, normal, point, Some(hit_entity))
        })
}

/// Rapier-specific ground detection system.
///
/// Casts the actor's own bounding box straight down by
/// `ground_cast_distance` against the configured ground groups.
fn rapier_ground_detection(
    time: Res<Time>,
    rapier_context: ReadRapierContext,
    mut q_actors: Query<
        (
            Entity,
            &GlobalTransform,
            &ControllerConfig,
            &Collider,
            &mut GroundSensor,
        ),
        (With<ChargeJumpController>, Without<ControllerDisabled>),
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };
    let now = time.elapsed_secs();

    for (entity, transform, config, collider, mut sensor) in &mut q_actors {
        let bounds = world_bounds(entity, collider, transform);
        let request = BoxCastRequest::ground(bounds.center, bounds.extents, config).excluding(entity);
        sensor.record(rapier_box_cast(&context, &request), now);
    }
}

/// Turn Rapier collision events between an actor and a tagged surface into
/// [`SurfaceContactEvent`]s.
///
/// Colliders without a [`SurfaceKind`] are ignored.
fn rapier_surface_contacts(
    mut collisions: EventReader<CollisionEvent>,
    q_actors: Query<(), With<ChargeJumpController>>,
    q_surfaces: Query<&SurfaceKind>,
    mut contacts: EventWriter<SurfaceContactEvent>,
) {
    for collision in collisions.read() {
        let (a, b, phase) = match *collision {
            CollisionEvent::Started(a, b, _) => (a, b, ContactPhase::Enter),
            CollisionEvent::Stopped(a, b, _) => (a, b, ContactPhase::Exit),
        };

        for (actor, surface) in [(a, b), (b, a)] {
            if !q_actors.contains(actor) {
                continue;
            }
            let Ok(kind) = q_surfaces.get(surface) else {
                continue;
            };
            contacts.write(SurfaceContactEvent {
                actor,
                surface,
                kind: *kind,
                phase,
            });
        }
    }
}

/// Bundle for creating an actor with Rapier2D physics.
///
/// Provides the rigid body, velocity tracking, axis locking and collision
/// event reporting the controller relies on. Add a [`Collider`] alongside.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use charge_jump_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         ChargeJumpController,
///         ControllerConfig::player(),
///         KeyboardControlled,
///         Rapier2dActorBundle::rotation_locked(),
///         Collider::cuboid(0.5, 0.5),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `locked_axes`: Empty
/// - `active_events`: [`ActiveEvents::COLLISION_EVENTS`], needed for surface contacts
#[derive(Bundle)]
pub struct Rapier2dActorBundle {
    pub rigid_body: RigidBody,
    pub velocity: Velocity,
    /// Which axes are locked. Use [`LockedAxes::ROTATION_LOCKED`] for simple platformers.
    pub locked_axes: LockedAxes,
    pub active_events: ActiveEvents,
}

impl Default for Rapier2dActorBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dActorBundle {
    /// Create a new actor bundle with rotation enabled.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            locked_axes: LockedAxes::empty(),
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }

    /// Create an actor bundle with rotation locked.
    ///
    /// This is the most common configuration for 2D platformers.
    pub fn rotation_locked() -> Self {
        Self {
            locked_axes: LockedAxes::ROTATION_LOCKED,
            ..Self::new()
        }
    }

    /// Set the rigid body type for the actor.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}
