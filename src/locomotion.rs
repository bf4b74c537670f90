//! Grounded locomotion and facing.

use bevy::prelude::*;

/// Which way the actor faces. Never zero.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Face the direction of the axis input. Zero input keeps the facing.
    pub fn update(&mut self, axis: f32) {
        if axis > 0.0 {
            *self = Facing::Right;
        } else if axis < 0.0 {
            *self = Facing::Left;
        }
    }

    /// `+1` when facing right, `-1` when facing left.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Velocity after walking with `axis` input.
///
/// The vertical component is kept so gravity and jumps are not fought.
#[inline]
pub fn apply_locomotion(axis: f32, move_speed: f32, velocity: Vec2) -> Vec2 {
    Vec2::new(axis * move_speed, velocity.y)
}

/// Mirror sprites to match their actor's facing.
///
/// Colliders are untouched.
pub fn mirror_sprites(mut q_sprites: Query<(&Facing, &mut Sprite), Changed<Facing>>) {
    for (facing, mut sprite) in &mut q_sprites {
        sprite.flip_x = *facing == Facing::Left;
    }
}
