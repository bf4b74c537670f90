//! Ground sensing.
//!
//! The controller classifies the actor as grounded or airborne once per tick
//! with a downward box cast built from the actor's collider bounds. Building
//! the cast is backend independent; executing it is the backend's job (see
//! the backend sensor systems), which then calls [`GroundSensor::record`].

use bevy::prelude::*;

use crate::collision::CollisionData;
use crate::config::ControllerConfig;

/// A box cast to be executed by the physics backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCastRequest {
    /// Center of the box at the start of the cast.
    pub origin: Vec2,
    /// Half size of the box.
    pub half_extents: Vec2,
    /// Direction of the cast (normalized).
    pub direction: Vec2,
    /// Maximum distance to cast.
    pub max_distance: f32,
    /// Collision group bits to hit.
    pub groups: u32,
    /// Entity to exclude from results.
    pub exclude: Option<Entity>,
}

impl BoxCastRequest {
    /// Create a new box cast request hitting every group.
    pub fn new(origin: Vec2, half_extents: Vec2, direction: Vec2, max_distance: f32) -> Self {
        Self {
            origin,
            half_extents: half_extents.abs(),
            direction: direction.normalize_or_zero(),
            max_distance,
            groups: u32::MAX,
            exclude: None,
        }
    }

    /// The ground cast for an actor: its own bounds, pushed down by
    /// `ground_cast_distance`, against the configured ground groups.
    pub fn ground(center: Vec2, half_extents: Vec2, config: &ControllerConfig) -> Self {
        Self::new(center, half_extents, Vec2::NEG_Y, config.ground_cast_distance)
            .with_groups(config.ground_groups)
    }

    /// Restrict the cast to some collision groups.
    pub fn with_groups(mut self, groups: u32) -> Self {
        self.groups = groups;
        self
    }

    /// Exclude an entity from the cast.
    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Bottom edge of the box after travelling the full distance.
    pub fn swept_bottom(&self) -> f32 {
        self.origin.y - self.half_extents.y + self.direction.y * self.max_distance
    }
}

/// Result of the ground cast for the current tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct GroundSensor {
    /// Whether the cast hit ground this tick.
    pub grounded: bool,
    /// Whether the cast hit ground on the previous tick.
    pub was_grounded: bool,
    /// The ground hit, if any.
    #[reflect(ignore)]
    pub contact: Option<CollisionData>,
    /// Elapsed-time stamp of the last update.
    pub updated_at: f32,
}

impl GroundSensor {
    /// Store this tick's cast result.
    pub fn record(&mut self, hit: Option<CollisionData>, now: f32) {
        self.was_grounded = self.grounded;
        self.grounded = hit.is_some();
        self.contact = hit;
        self.updated_at = now;
    }

    /// Check if grounded.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Check if this tick is the first grounded one after being airborne.
    #[inline]
    pub fn just_landed(&self) -> bool {
        self.grounded && !self.was_grounded
    }

    /// Get the ground entity, if grounded on one.
    pub fn ground_entity(&self) -> Option<Entity> {
        self.contact.and_then(|c| c.entity)
    }
}
