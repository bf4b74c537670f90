//! Stuck detection and recovery.
//!
//! An actor that stays airborne without moving (wedged between colliders,
//! resting on a non-ground ledge) is teleported on top of the nearest
//! collider after [`ControllerConfig::stuck_threshold`] seconds.

use bevy::prelude::*;

use crate::collision::ColliderBounds;
use crate::config::ControllerConfig;

/// Relative slack on the threshold so `dt` rounding at fixed frame rates
/// does not push recovery one frame late.
const THRESHOLD_TOLERANCE: f32 = 1e-4;

/// Tracks how long the actor has been airborne and stationary.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct StuckTracker {
    /// Position recorded on the previous tick.
    pub last_position: Option<Vec2>,
    /// Seconds spent airborne with displacement under `min_motion`.
    pub elapsed: f32,
}

impl StuckTracker {
    /// Feed one tick. Returns `true` when recovery should run this tick.
    ///
    /// The first tick has no previous position and never counts as stuck.
    pub fn update(
        &mut self,
        position: Vec2,
        grounded: bool,
        dt: f32,
        config: &ControllerConfig,
    ) -> bool {
        let stationary = self
            .last_position
            .is_some_and(|last| position.distance(last) < config.min_motion);
        self.last_position = Some(position);

        if grounded || !stationary {
            self.elapsed = 0.0;
            return false;
        }

        self.elapsed += dt;
        if self.elapsed >= config.stuck_threshold * (1.0 - THRESHOLD_TOLERANCE) {
            self.elapsed = 0.0;
            return true;
        }
        false
    }

    /// Record a position override so it is not mistaken for motion.
    pub fn teleported(&mut self, position: Vec2) {
        self.last_position = Some(position);
    }
}

/// The anchor closest to `position`, measured to bounds centers.
pub fn nearest_anchor(position: Vec2, anchors: &[ColliderBounds]) -> Option<&ColliderBounds> {
    anchors.iter().min_by(|a, b| {
        position
            .distance_squared(a.center)
            .total_cmp(&position.distance_squared(b.center))
    })
}

/// Where the actor lands when recovering onto `anchor`.
#[inline]
pub fn recovery_position(anchor: &ColliderBounds, actor_half_height: f32) -> Vec2 {
    anchor.top_center() + Vec2::Y * actor_half_height
}

/// Pick the recovery destination, skipping the actor's own collider.
pub fn find_recovery_target(
    actor: Entity,
    position: Vec2,
    actor_half_height: f32,
    anchors: &[ColliderBounds],
) -> Option<(Entity, Vec2)> {
    let eligible: Vec<ColliderBounds> = anchors
        .iter()
        .filter(|anchor| anchor.entity != actor)
        .copied()
        .collect();

    nearest_anchor(position, &eligible)
        .map(|anchor| (anchor.entity, recovery_position(anchor, actor_half_height)))
}

/// Emitted whenever the controller overrides an actor's position.
///
/// Cameras and followers can use it to snap instead of easing.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PositionOverridden {
    /// The teleported actor.
    pub entity: Entity,
    /// Position before the override.
    pub from: Vec2,
    /// Position after the override.
    pub to: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> ControllerConfig {
        ControllerConfig::default()
    }

    #[test]
    fn first_tick_is_not_stuck() {
        let mut tracker = StuckTracker::default();
        assert!(!tracker.update(Vec2::ZERO, false, DT, &config()));
        assert_eq!(tracker.elapsed, 0.0);
    }

    #[test]
    fn accumulates_while_airborne_and_stationary() {
        let mut tracker = StuckTracker::default();
        tracker.update(Vec2::ZERO, false, DT, &config());
        for _ in 0..30 {
            assert!(!tracker.update(Vec2::new(0.001, 0.0), false, DT, &config()));
        }
        assert!((tracker.elapsed - 0.5).abs() < 1e-4);
    }

    #[test]
    fn triggers_at_threshold_and_resets() {
        let config = ControllerConfig::default().with_stuck_detection(0.01, 1.0);
        let mut tracker = StuckTracker::default();
        tracker.update(Vec2::ZERO, false, 0.25, &config);

        assert!(!tracker.update(Vec2::ZERO, false, 0.25, &config));
        assert!(!tracker.update(Vec2::ZERO, false, 0.25, &config));
        assert!(!tracker.update(Vec2::ZERO, false, 0.25, &config));
        assert!(tracker.update(Vec2::ZERO, false, 0.25, &config));
        assert_eq!(tracker.elapsed, 0.0);
    }

    #[test]
    fn triggers_on_exact_threshold_frame_at_60hz() {
        let config = config();
        let mut tracker = StuckTracker::default();
        tracker.update(Vec2::ZERO, false, DT, &config);

        let fired = (1..=300).find(|_| tracker.update(Vec2::ZERO, false, DT, &config));
        assert_eq!(fired, Some(240));
    }

    #[test]
    fn grounded_resets_regardless_of_elapsed() {
        let mut tracker = StuckTracker {
            last_position: Some(Vec2::ZERO),
            elapsed: 3.9,
        };
        assert!(!tracker.update(Vec2::ZERO, true, DT, &config()));
        assert_eq!(tracker.elapsed, 0.0);
    }

    #[test]
    fn motion_resets() {
        let mut tracker = StuckTracker {
            last_position: Some(Vec2::ZERO),
            elapsed: 2.0,
        };
        assert!(!tracker.update(Vec2::new(0.5, 0.0), false, DT, &config()));
        assert_eq!(tracker.elapsed, 0.0);
        assert_eq!(tracker.last_position, Some(Vec2::new(0.5, 0.0)));
    }

    #[test]
    fn nearest_anchor_by_center_distance() {
        let near = ColliderBounds::new(Entity::from_raw(1), Vec2::new(3.0, 0.0), Vec2::splat(1.0));
        let far = ColliderBounds::new(Entity::from_raw(2), Vec2::new(-10.0, 0.0), Vec2::splat(5.0));

        let anchors = [far, near];
        let anchor = nearest_anchor(Vec2::ZERO, &anchors).unwrap();
        assert_eq!(anchor.entity, Entity::from_raw(1));
    }

    #[test]
    fn recovery_lands_on_top_center() {
        let anchor = ColliderBounds::new(Entity::from_raw(1), Vec2::new(3.0, 0.0), Vec2::new(2.0, 0.5));
        assert_eq!(recovery_position(&anchor, 1.0), Vec2::new(3.0, 1.5));
    }

    #[test]
    fn own_collider_is_excluded() {
        let actor = Entity::from_raw(1);
        let own = ColliderBounds::new(actor, Vec2::ZERO, Vec2::splat(0.5));
        let other = ColliderBounds::new(Entity::from_raw(2), Vec2::new(0.0, -10.0), Vec2::new(4.0, 1.0));

        let (target, position) = find_recovery_target(actor, Vec2::ZERO, 0.5, &[own, other]).unwrap();
        assert_eq!(target, Entity::from_raw(2));
        assert_eq!(position, Vec2::new(0.0, -8.5));
    }

    #[test]
    fn no_anchor_means_no_target() {
        let actor = Entity::from_raw(1);
        let own = ColliderBounds::new(actor, Vec2::ZERO, Vec2::splat(0.5));
        assert_eq!(find_recovery_target(actor, Vec2::ZERO, 0.5, &[own]), None);
        assert_eq!(find_recovery_target(actor, Vec2::ZERO, 0.5, &[]), None);
    }
}
