//! Pistons: platforms that lunge at a nearby player.
//!
//! A piston watches one target actor. When the target is within
//! `trigger_distance` horizontally on the side the piston faces, it slides
//! that way at `move_speed` until it has travelled `maximum_distance`. Once
//! the target leaves the trigger zone, or the limit is reached, it glides
//! back to where it started at `return_speed` and only re-arms on arrival.

use bevy::prelude::*;

/// Side a piston faces and moves toward.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PistonDirection {
    #[default]
    Left,
    Right,
}

impl PistonDirection {
    /// Unit vector of the movement direction.
    #[inline]
    pub fn vector(self) -> Vec2 {
        match self {
            PistonDirection::Left => Vec2::NEG_X,
            PistonDirection::Right => Vec2::X,
        }
    }
}

/// A player-triggered moving platform.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct Piston {
    /// The actor the piston reacts to.
    pub target: Entity,
    pub direction: PistonDirection,
    /// Horizontal reach of the trigger zone.
    pub trigger_distance: f32,
    pub move_speed: f32,
    pub return_speed: f32,
    /// Furthest the piston may travel from its initial position.
    pub maximum_distance: f32,
    /// Rest position. Captured from the transform on the first tick if unset.
    pub initial_position: Option<Vec2>,
    /// Gliding back to the rest position.
    pub returning: bool,
}

impl Piston {
    /// Create a piston reacting to `target` with default tuning.
    pub fn new(target: Entity, direction: PistonDirection) -> Self {
        Self {
            target,
            direction,
            trigger_distance: 5.0,
            move_speed: 10.0,
            return_speed: 2.0,
            maximum_distance: 20.0,
            initial_position: None,
            returning: false,
        }
    }

    /// Builder: set the trigger distance.
    pub fn with_trigger_distance(mut self, distance: f32) -> Self {
        self.trigger_distance = distance;
        self
    }

    /// Builder: set the lunge and return speeds.
    pub fn with_speeds(mut self, move_speed: f32, return_speed: f32) -> Self {
        self.move_speed = move_speed;
        self.return_speed = return_speed;
        self
    }

    /// Builder: set the travel limit.
    pub fn with_maximum_distance(mut self, distance: f32) -> Self {
        self.maximum_distance = distance;
        self
    }

    /// Whether the target at `target_x` is in the trigger zone.
    pub fn is_triggered(&self, position: Vec2, target_x: f32) -> bool {
        let offset = target_x - position.x;
        let on_side = match self.direction {
            PistonDirection::Left => offset <= 0.0,
            PistonDirection::Right => offset >= 0.0,
        };
        on_side && offset.abs() <= self.trigger_distance
    }

    /// Advance one tick. Returns the new position.
    pub fn step(&mut self, position: Vec2, target_x: f32, dt: f32) -> Vec2 {
        let initial = *self.initial_position.get_or_insert(position);

        if self.returning {
            if position == initial {
                self.returning = false;
                return position;
            }
            return move_towards(position, initial, self.return_speed * dt);
        }

        if !self.is_triggered(position, target_x) {
            self.returning = true;
            return position;
        }

        if initial.distance(position) < self.maximum_distance {
            position + self.direction.vector() * self.move_speed * dt
        } else {
            self.returning = true;
            position
        }
    }
}

/// Move `from` toward `to` by at most `max_step`, never overshooting.
pub fn move_towards(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= max_step || distance <= f32::EPSILON {
        to
    } else {
        from + delta / distance * max_step
    }
}

/// Drive every piston from its target's position.
pub fn drive_pistons(
    time: Res<Time>,
    mut q_pistons: Query<(&mut Piston, &mut Transform)>,
    q_targets: Query<&GlobalTransform>,
) {
    let dt = time.delta_secs();
    for (mut piston, mut transform) in &mut q_pistons {
        let Ok(target) = q_targets.get(piston.target) else {
            continue;
        };
        let position = transform.translation.truncate();
        let next = piston.step(position, target.translation().x, dt);
        if next != position {
            transform.translation.x = next.x;
            transform.translation.y = next.y;
        }
    }
}
