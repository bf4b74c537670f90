//! # `charge_jump_controller`
//!
//! A 2D charge-jump platformer character controller with physics backend
//! abstraction.
//!
//! This crate provides a character controller that:
//! - Walks with horizontal input while grounded, except on slippery surfaces
//! - Charges a jump while the jump input is held and launches on release
//! - Leans the jump left or right with the directional inputs
//! - Previews the launch arc while charging
//! - Enforces a cooldown between launches
//! - Teleports the actor onto the nearest collider when it is stuck airborne
//! - Abstracts the physics backend for easy swapping (Rapier2D included)
//!
//! ## Architecture
//!
//! Every tick, in order:
//! 1. The input sample is written (from the keyboard, or by your code)
//! 2. The backend runs the ground box cast
//! 3. The charge state machine, trajectory preview and locomotion run
//! 4. The stuck monitor may override the actor's position
//! 5. Presentation (sprite mirroring, pistons, scenery) catches up
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use charge_jump_controller::prelude::*;
//!
//! // Components for a keyboard-driven player
//! let controller = ChargeJumpController;
//! let config = ControllerConfig::player();
//! let input = KeyboardControlled;
//!
//! // These can be spawned with the backend's physics components
//! ```

use core::marker::PhantomData;

use bevy::ecs::intern::Interned;
use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

pub mod backend;
pub mod charge;
pub mod collision;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod locomotion;
pub mod piston;
pub mod scenery;
pub mod sensor;
pub mod session;
pub mod state;
pub mod stuck;
pub mod surface;
pub mod systems;
pub mod trajectory;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::CharacterPhysicsBackend;
    pub use crate::charge::{ChargeState, DirectionBias, JumpCharge, Launch};
    pub use crate::collision::{ColliderBounds, CollisionData};
    pub use crate::config::{ControllerConfig, KeyBindings};
    pub use crate::controller::ChargeJumpController;
    pub use crate::error::ControllerError;
    pub use crate::input::{InputSample, KeyboardControlled};
    pub use crate::locomotion::Facing;
    pub use crate::piston::{Piston, PistonDirection};
    pub use crate::scenery::{ArcMover, Cloud, CloudSpawner};
    pub use crate::sensor::{BoxCastRequest, GroundSensor};
    pub use crate::session::{ChoiceLog, ChoiceMade};
    pub use crate::state::{Airborne, Charging, ControllerDisabled, Grounded, MovementLock};
    pub use crate::stuck::{PositionOverridden, StuckTracker};
    pub use crate::surface::{ContactPhase, SurfaceContact, SurfaceContactEvent, SurfaceKind};
    pub use crate::systems::JumpLaunched;
    pub use crate::trajectory::TrajectoryPreview;
    pub use crate::{ChargeJumpDebugPlugin, ChargeJumpPlugin, ChargeJumpSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dActorBundle, Rapier2dBackend};
}

/// System sets for the controller, run in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeJumpSet {
    /// Validation of new actors and input sampling.
    Input,
    /// Ground sensing by the physics backend.
    Sensors,
    /// Surface contacts, charge, preview and locomotion.
    Controller,
    /// Stuck detection and recovery teleports.
    Recovery,
    /// Sprite mirroring, pistons, session bookkeeping.
    Presentation,
}

/// Main plugin for the charge jump controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (box casts, velocity, position, collider bounds).
///
/// The controller runs once per rendered frame in [`Update`] by default, so
/// input edges are never missed. Use [`ChargeJumpPlugin::new`] to pick another
/// schedule.
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use charge_jump_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(ChargeJumpPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct ChargeJumpPlugin<B: backend::CharacterPhysicsBackend> {
    schedule: Interned<dyn ScheduleLabel>,
    _marker: PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> ChargeJumpPlugin<B> {
    /// Create a new plugin running in the given schedule.
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
            _marker: PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Default for ChargeJumpPlugin<B> {
    fn default() -> Self {
        Self::new(Update)
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for ChargeJumpPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::ControllerConfig>();
        app.register_type::<config::KeyBindings>();
        app.register_type::<controller::ChargeJumpController>();
        app.register_type::<input::InputSample>();
        app.register_type::<input::KeyboardControlled>();
        app.register_type::<sensor::GroundSensor>();
        app.register_type::<surface::SurfaceContact>();
        app.register_type::<surface::SurfaceKind>();
        app.register_type::<charge::JumpCharge>();
        app.register_type::<trajectory::TrajectoryPreview>();
        app.register_type::<stuck::StuckTracker>();
        app.register_type::<locomotion::Facing>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Charging>();
        app.register_type::<state::MovementLock>();
        app.register_type::<state::ControllerDisabled>();
        app.register_type::<piston::Piston>();
        app.register_type::<scenery::Cloud>();
        app.register_type::<scenery::ArcMover>();
        app.register_type::<session::ChoiceLog>();

        app.add_event::<surface::SurfaceContactEvent>();
        app.add_event::<systems::JumpLaunched>();
        app.add_event::<stuck::PositionOverridden>();
        app.add_event::<session::ChoiceMade>();
        app.init_resource::<session::ChoiceLog>();

        app.configure_sets(
            self.schedule,
            (
                ChargeJumpSet::Input,
                ChargeJumpSet::Sensors,
                ChargeJumpSet::Controller,
                ChargeJumpSet::Recovery,
                ChargeJumpSet::Presentation,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin(self.schedule));

        app.add_systems(
            self.schedule,
            (
                systems::validate_controllers::<B>,
                input::sample_keyboard_input,
            )
                .chain()
                .in_set(ChargeJumpSet::Input),
        );

        app.add_systems(
            self.schedule,
            (
                surface::apply_surface_contacts,
                systems::cancel_locked_charges,
                systems::run_movement_controllers::<B>,
                state::sync_state_markers,
            )
                .chain()
                .in_set(ChargeJumpSet::Controller),
        );

        app.add_systems(
            self.schedule,
            systems::recover_stuck_actors::<B>.in_set(ChargeJumpSet::Recovery),
        );

        app.add_systems(
            self.schedule,
            (
                locomotion::mirror_sprites,
                piston::drive_pistons,
                scenery::spawn_clouds,
                scenery::drift_clouds,
                scenery::swing_arc_movers,
                session::record_choices,
            )
                .in_set(ChargeJumpSet::Presentation),
        );
    }
}

/// Draws trajectory previews and arc mover tethers with gizmos.
///
/// Requires the gizmo plugin (part of `DefaultPlugins`).
pub struct ChargeJumpDebugPlugin;

impl Plugin for ChargeJumpDebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            (
                trajectory::draw_trajectory_previews,
                scenery::draw_arc_tethers,
            ),
        );
    }
}
