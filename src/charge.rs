//! Jump charge state machine.
//!
//! A jump is charged by holding the charge input while grounded, steered with
//! the directional inputs, and launched on release. After a launch the actor
//! waits out a cooldown before another charge may start.
//!
//! ```text
//!   Idle ──charge held──▶ Charging ──release──▶ CooldownWait ──deadline──▶ Idle
//!                          ▲    │
//!                          └────┘ force += rate · dt (clamped), bias re-read
//! ```

use bevy::prelude::*;

use crate::config::ControllerConfig;

/// Signed horizontal lean of a jump.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectionBias {
    Left,
    #[default]
    Neutral,
    Right,
}

impl DirectionBias {
    /// Resolve the bias from the held directional inputs.
    ///
    /// Right is checked last and wins when both are held.
    pub fn from_held(left_held: bool, right_held: bool) -> Self {
        let mut bias = Self::Neutral;
        if left_held {
            bias = Self::Left;
        }
        if right_held {
            bias = Self::Right;
        }
        bias
    }

    /// The bias as `-1`, `0` or `+1`.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Neutral => 0.0,
            Self::Right => 1.0,
        }
    }
}

/// State of the jump charge.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub enum ChargeState {
    /// Ready to charge.
    #[default]
    Idle,
    /// Charge input held.
    Charging {
        /// Seconds spent charging, excluding the entry tick.
        charged_for: f32,
        /// Bias read on the latest tick.
        direction: DirectionBias,
    },
    /// Launched; waiting for the cooldown deadline.
    CooldownWait {
        /// Elapsed-time stamp at which charging is allowed again.
        ready_at: f32,
    },
}

/// A completed launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    /// Velocity to hand to the physics integrator.
    pub velocity: Vec2,
    /// Force accumulated at release.
    pub force: f32,
    /// Bias frozen at release.
    pub direction: DirectionBias,
}

/// Launch velocity for a charged force and bias.
pub fn launch_velocity(force: f32, direction: DirectionBias, horizontal_fraction: f32) -> Vec2 {
    Vec2::new(direction.sign() * force * horizontal_fraction, force)
}

/// Jump charge component.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct JumpCharge {
    state: ChargeState,
}

impl JumpCharge {
    /// Create an idle jump charge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> ChargeState {
        self.state
    }

    /// Check if charging.
    #[inline]
    pub fn is_charging(&self) -> bool {
        matches!(self.state, ChargeState::Charging { .. })
    }

    /// Check if an unexpired cooldown blocks charging and walking at `now`.
    pub fn is_cooling_down(&self, now: f32) -> bool {
        matches!(self.state, ChargeState::CooldownWait { ready_at } if now < ready_at)
    }

    /// Return to Idle once the cooldown deadline has passed.
    ///
    /// Returns `true` on the tick the cooldown ends.
    pub fn update_cooldown(&mut self, now: f32) -> bool {
        if let ChargeState::CooldownWait { ready_at } = self.state {
            if now >= ready_at {
                self.state = ChargeState::Idle;
                return true;
            }
        }
        false
    }

    /// Accumulated force, only present while charging.
    pub fn force(&self, config: &ControllerConfig) -> Option<f32> {
        match self.state {
            ChargeState::Charging { charged_for, .. } => Some(charged_force(charged_for, config)),
            _ => None,
        }
    }

    /// Current direction bias; neutral unless charging.
    pub fn direction(&self) -> DirectionBias {
        match self.state {
            ChargeState::Charging { direction, .. } => direction,
            _ => DirectionBias::Neutral,
        }
    }

    /// Velocity a launch would produce right now.
    pub fn current_launch_velocity(&self, config: &ControllerConfig) -> Option<Vec2> {
        self.force(config)
            .map(|force| launch_velocity(force, self.direction(), config.horizontal_force_fraction))
    }

    /// Start charging at the minimum force.
    ///
    /// Does nothing unless Idle (a finished cooldown counts as Idle).
    /// Returns `true` if a new charge started.
    pub fn start(&mut self, now: f32) -> bool {
        self.update_cooldown(now);
        if self.state != ChargeState::Idle {
            return false;
        }
        self.state = ChargeState::Charging {
            charged_for: 0.0,
            direction: DirectionBias::Neutral,
        };
        true
    }

    /// Accumulate charge time.
    pub fn charge(&mut self, dt: f32, config: &ControllerConfig) {
        if let ChargeState::Charging { charged_for, .. } = &mut self.state {
            *charged_for += dt.max(0.0);
            debug_assert!(charged_force(*charged_for, config) <= config.max_jump_force);
        }
    }

    /// Re-read the direction bias from the held inputs.
    pub fn steer(&mut self, left_held: bool, right_held: bool) {
        if let ChargeState::Charging { direction, .. } = &mut self.state {
            *direction = DirectionBias::from_held(left_held, right_held);
        }
    }

    /// Release the charge, entering the cooldown.
    ///
    /// Returns `None` when not charging.
    pub fn launch(&mut self, now: f32, config: &ControllerConfig) -> Option<Launch> {
        let ChargeState::Charging {
            charged_for,
            direction,
        } = self.state
        else {
            return None;
        };

        let force = charged_force(charged_for, config);
        self.state = ChargeState::CooldownWait {
            ready_at: now + config.jump_cooldown,
        };

        Some(Launch {
            velocity: launch_velocity(force, direction, config.horizontal_force_fraction),
            force,
            direction,
        })
    }

    /// Drop any charge in progress, keeping a pending cooldown.
    pub fn reset(&mut self) {
        if self.is_charging() {
            self.state = ChargeState::Idle;
        }
    }

    /// Drop any charge and any pending cooldown.
    pub fn cancel(&mut self) {
        self.state = ChargeState::Idle;
    }
}

/// Force after `charged_for` seconds of charging.
pub fn charged_force(charged_for: f32, config: &ControllerConfig) -> f32 {
    (config.min_jump_force + config.charge_rate * charged_for).min(config.max_jump_force)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ControllerConfig {
        ControllerConfig::default()
            .with_jump_force(1.0, 5.0)
            .with_charge_rate(2.0)
            .with_jump_cooldown(0.5)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // ==================== DirectionBias Tests ====================

    #[test]
    fn bias_from_inputs() {
        assert_eq!(DirectionBias::from_held(false, false), DirectionBias::Neutral);
        assert_eq!(DirectionBias::from_held(true, false), DirectionBias::Left);
        assert_eq!(DirectionBias::from_held(false, true), DirectionBias::Right);
    }

    #[test]
    fn right_wins_when_both_held() {
        assert_eq!(DirectionBias::from_held(true, true), DirectionBias::Right);
    }

    #[test]
    fn bias_signs() {
        assert_eq!(DirectionBias::Left.sign(), -1.0);
        assert_eq!(DirectionBias::Neutral.sign(), 0.0);
        assert_eq!(DirectionBias::Right.sign(), 1.0);
    }

    // ==================== Charging Tests ====================

    #[test]
    fn start_enters_charging_at_min_force() {
        let config = config();
        let mut charge = JumpCharge::new();

        assert!(charge.start(0.0));
        assert!(charge.is_charging());
        assert_eq!(charge.force(&config), Some(1.0));
    }

    #[test]
    fn idle_has_no_force() {
        assert_eq!(JumpCharge::new().force(&config()), None);
    }

    #[test]
    fn start_while_charging_keeps_progress() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);
        charge.charge(1.0, &config);

        assert!(!charge.start(1.0));
        assert!(approx(charge.force(&config).unwrap(), 3.0));
    }

    #[test]
    fn force_follows_closed_form() {
        let config = config();
        for duration in [0.0, 0.25, 1.0, 1.9, 2.0, 3.0, 10.0] {
            let mut charge = JumpCharge::new();
            charge.start(0.0);

            // Charge in 1/60 s steps
            let steps = (duration * 60.0_f32).round() as usize;
            for _ in 0..steps {
                charge.charge(1.0 / 60.0, &config);
            }

            let expected = (1.0 + 2.0 * (steps as f32 / 60.0)).min(5.0);
            let force = charge.force(&config).unwrap();
            assert!(approx(force, expected), "d={duration}: {force} != {expected}");
            assert!(force <= config.max_jump_force);
        }
    }

    #[test]
    fn force_is_monotonic_and_clamped() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);

        let mut previous = charge.force(&config).unwrap();
        for _ in 0..600 {
            charge.charge(1.0 / 60.0, &config);
            let force = charge.force(&config).unwrap();
            assert!(force >= previous);
            assert!(force <= config.max_jump_force);
            previous = force;
        }
        assert_eq!(previous, config.max_jump_force);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);
        charge.charge(-1.0, &config);
        assert_eq!(charge.force(&config), Some(1.0));
    }

    #[test]
    fn steer_is_reevaluated_each_tick() {
        let mut charge = JumpCharge::new();
        charge.start(0.0);

        charge.steer(true, false);
        assert_eq!(charge.direction(), DirectionBias::Left);
        charge.steer(false, false);
        assert_eq!(charge.direction(), DirectionBias::Neutral);
        charge.steer(true, true);
        assert_eq!(charge.direction(), DirectionBias::Right);
    }

    #[test]
    fn steer_outside_charging_does_nothing() {
        let mut charge = JumpCharge::new();
        charge.steer(true, false);
        assert_eq!(charge.direction(), DirectionBias::Neutral);
    }

    // ==================== Launch Tests ====================

    #[test]
    fn launch_velocity_components() {
        let velocity = launch_velocity(4.0, DirectionBias::Left, 0.5);
        assert_eq!(velocity, Vec2::new(-2.0, 4.0));

        let velocity = launch_velocity(4.0, DirectionBias::Neutral, 0.5);
        assert_eq!(velocity, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn launch_uses_accumulated_force_and_bias() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);
        charge.charge(1.0, &config);
        charge.steer(false, true);

        let launch = charge.launch(1.0, &config).unwrap();

        assert!(approx(launch.force, 3.0));
        assert_eq!(launch.direction, DirectionBias::Right);
        assert!(approx(launch.velocity.x, 1.5));
        assert!(approx(launch.velocity.y, 3.0));
        assert_eq!(charge.state(), ChargeState::CooldownWait { ready_at: 1.5 });
        assert_eq!(charge.force(&config), None);
        assert_eq!(charge.direction(), DirectionBias::Neutral);
    }

    #[test]
    fn launch_when_idle_is_none() {
        let mut charge = JumpCharge::new();
        assert_eq!(charge.launch(0.0, &config()), None);
        assert_eq!(charge.state(), ChargeState::Idle);
    }

    // ==================== Cooldown Tests ====================

    #[test]
    fn no_charge_during_cooldown() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);
        charge.launch(1.0, &config);

        assert!(charge.is_cooling_down(1.2));
        assert!(!charge.start(1.2));
        assert!(!charge.start(1.49));
        assert!(!charge.is_cooling_down(1.5));
        assert!(charge.start(1.5));
    }

    #[test]
    fn charging_is_not_cooling_down() {
        let mut charge = JumpCharge::new();
        assert!(!charge.is_cooling_down(0.0));
        charge.start(0.0);
        assert!(!charge.is_cooling_down(0.0));
    }

    #[test]
    fn update_cooldown_reports_end() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);
        charge.launch(0.0, &config);

        assert!(!charge.update_cooldown(0.4));
        assert!(charge.update_cooldown(0.5));
        assert_eq!(charge.state(), ChargeState::Idle);
        assert!(!charge.update_cooldown(0.6));
    }

    #[test]
    fn reset_keeps_pending_cooldown() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);
        charge.launch(0.0, &config);

        charge.reset();
        assert_eq!(charge.state(), ChargeState::CooldownWait { ready_at: 0.5 });
    }

    #[test]
    fn reset_drops_charge() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);
        charge.charge(0.5, &config);

        charge.reset();
        assert_eq!(charge.state(), ChargeState::Idle);
        assert_eq!(charge.force(&config), None);
    }

    #[test]
    fn cancel_clears_cooldown() {
        let config = config();
        let mut charge = JumpCharge::new();
        charge.start(0.0);
        charge.launch(0.0, &config);

        charge.cancel();
        assert_eq!(charge.state(), ChargeState::Idle);
        assert!(charge.start(0.0));
    }
}
