//! Collision query result structures.
//!
//! These structures carry the results of physics queries (box casts for
//! ground detection, collider bounds for stuck recovery) from the physics
//! backend to the controller.

use bevy::prelude::*;

/// Information about a box cast hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance travelled by the cast before the hit.
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec2,
    /// World position of the hit point.
    pub point: Vec2,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec2, point: Vec2, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// World-space axis-aligned bounds of a collider.
///
/// Used as a teleport anchor by stuck recovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderBounds {
    /// Entity owning the collider.
    pub entity: Entity,
    /// Center of the bounding box.
    pub center: Vec2,
    /// Half size of the bounding box.
    pub extents: Vec2,
}

impl ColliderBounds {
    /// Create bounds from a center point and half extents.
    pub fn new(entity: Entity, center: Vec2, extents: Vec2) -> Self {
        Self {
            entity,
            center,
            extents: extents.abs(),
        }
    }

    /// Create bounds from min and max corners.
    pub fn from_min_max(entity: Entity, min: Vec2, max: Vec2) -> Self {
        Self::new(entity, (min + max) * 0.5, (max - min) * 0.5)
    }

    /// Upper-right corner of the bounding box.
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.extents
    }

    /// Lower-left corner of the bounding box.
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.extents
    }

    /// The point centered on the top edge.
    #[inline]
    pub fn top_center(&self) -> Vec2 {
        Vec2::new(self.center.x, self.max().y)
    }
}
