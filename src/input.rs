//! Per-tick input samples.
//!
//! An [`InputSample`] is produced once per tick and read by the controller.
//! Player actors get it from the keyboard via [`sample_keyboard_input`]; AI,
//! network or test code can write the component directly instead.

use bevy::prelude::*;

use crate::config::KeyBindings;

/// The input state for one tick.
///
/// # Example
///
/// ```rust
/// use charge_jump_controller::prelude::*;
///
/// let mut input = InputSample::default();
/// input.set_axis(2.0);
/// assert_eq!(input.horizontal_axis, 1.0);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct InputSample {
    /// The charge input is held this tick.
    pub charge_held: bool,
    /// The charge input was released this tick.
    pub charge_released: bool,
    /// Horizontal axis in `[-1, 1]`.
    pub horizontal_axis: f32,
    /// Left steering input is held.
    pub left_held: bool,
    /// Right steering input is held.
    pub right_held: bool,
}

impl InputSample {
    /// Create an empty input sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal axis, clamped to `[-1, 1]`.
    pub fn set_axis(&mut self, axis: f32) {
        self.horizontal_axis = axis.clamp(-1.0, 1.0);
    }

    /// Sample holding the charge input.
    pub fn charging() -> Self {
        Self {
            charge_held: true,
            ..default()
        }
    }

    /// Sample releasing the charge input.
    pub fn releasing() -> Self {
        Self {
            charge_released: true,
            ..default()
        }
    }

    /// Builder: hold left and right steering.
    pub fn steering(mut self, left: bool, right: bool) -> Self {
        self.left_held = left;
        self.right_held = right;
        self
    }

    /// Builder: set the horizontal axis.
    pub fn with_axis(mut self, axis: f32) -> Self {
        self.set_axis(axis);
        self
    }

    /// Build a sample from keyboard state.
    ///
    /// The axis is the digital difference of right and left.
    pub fn from_keyboard(keyboard: &ButtonInput<KeyCode>, bindings: &KeyBindings) -> Self {
        let left_held = keyboard.any_pressed(bindings.left.iter().copied());
        let right_held = keyboard.any_pressed(bindings.right.iter().copied());
        let axis = f32::from(u8::from(right_held)) - f32::from(u8::from(left_held));

        Self {
            charge_held: keyboard.any_pressed(bindings.charge.iter().copied()),
            charge_released: keyboard.any_just_released(bindings.charge.iter().copied()),
            horizontal_axis: axis,
            left_held,
            right_held,
        }
    }
}

/// Marker for actors whose [`InputSample`] comes from the keyboard.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
#[require(KeyBindings, InputSample)]
pub struct KeyboardControlled;

/// Write a fresh [`InputSample`] for every keyboard-controlled actor.
pub fn sample_keyboard_input(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mut q_actors: Query<(&KeyBindings, &mut InputSample), With<KeyboardControlled>>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };

    for (bindings, mut sample) in &mut q_actors {
        *sample = InputSample::from_keyboard(&keyboard, bindings);
    }
}
