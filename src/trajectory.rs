//! Trajectory preview.
//!
//! While a jump is charging, the controller samples the projectile arc the
//! launch would follow. The arc always spans one unit of simulated time,
//! sampled at `t = i / sample_count`, so it reads the same regardless of
//! how much force is charged. It is a display aid, not a landing prediction.

use bevy::prelude::*;

/// Position at time `t` under constant gravity.
#[inline]
pub fn position_at(start: Vec2, velocity: Vec2, gravity: Vec2, t: f32) -> Vec2 {
    start + velocity * t + 0.5 * gravity * (t * t)
}

/// Lazy sequence of preview points.
///
/// Cloning restarts the sequence from the current point.
#[derive(Debug, Clone)]
pub struct TrajectorySamples {
    start: Vec2,
    velocity: Vec2,
    gravity: Vec2,
    sample_count: usize,
    next: usize,
}

impl Iterator for TrajectorySamples {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.next >= self.sample_count {
            return None;
        }
        let t = self.next as f32 / self.sample_count as f32;
        self.next += 1;
        Some(position_at(self.start, self.velocity, self.gravity, t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sample_count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrajectorySamples {}

/// Sample `sample_count` points of the arc starting at `start`.
///
/// The first point is `start` itself.
pub fn compute_preview(
    start: Vec2,
    velocity: Vec2,
    gravity: Vec2,
    sample_count: usize,
) -> TrajectorySamples {
    TrajectorySamples {
        start,
        velocity,
        gravity,
        sample_count,
        next: 0,
    }
}

/// The preview shown while charging.
///
/// Rendering collaborators read `points` when `visible` is set.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct TrajectoryPreview {
    /// Whether the preview should be drawn.
    pub visible: bool,
    /// Points of the arc, oldest sample first.
    pub points: Vec<Vec2>,
}

impl TrajectoryPreview {
    /// Replace the points and show the preview.
    pub fn show(&mut self, samples: impl Iterator<Item = Vec2>) {
        self.points.clear();
        self.points.extend(samples);
        self.visible = true;
    }

    /// Hide the preview.
    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Draw visible previews with gizmos.
pub fn draw_trajectory_previews(mut gizmos: Gizmos, q_previews: Query<&TrajectoryPreview>) {
    for preview in &q_previews {
        if preview.visible && preview.points.len() > 1 {
            gizmos.linestrip_2d(preview.points.iter().copied(), Color::BLACK);
        }
    }
}
