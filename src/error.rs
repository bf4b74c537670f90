//! Controller error types.

use bevy::prelude::*;
use thiserror::Error;

/// Errors raised while configuring a charge jump controller.
///
/// None of these are fatal to the app: a controller that fails validation is
/// marked with [`ControllerDisabled`](crate::state::ControllerDisabled) and
/// skipped by every controller system.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A component the backend needs is absent from the actor.
    #[error("entity {entity} is missing required collaborator `{collaborator}`")]
    MissingCollaborator {
        entity: Entity,
        collaborator: &'static str,
    },

    /// The jump force range is empty or not finite.
    #[error("jump force range is invalid: min {min} > max {max}")]
    InvalidForceRange { min: f32, max: f32 },

    /// A tuning value that must be positive is not above zero or not finite.
    #[error("`{name}` must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    /// A duration or rate that must not be negative is negative or not finite.
    #[error("`{name}` must be finite and not negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    /// Preview gravity has a NaN or infinite component.
    #[error("preview gravity must be finite, got {0}")]
    NonFiniteGravity(Vec2),

    /// The trajectory preview needs at least one sample.
    #[error("trajectory resolution must be at least 1")]
    EmptyTrajectory,

    /// The configuration file could not be parsed.
    #[error("failed to parse controller config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
