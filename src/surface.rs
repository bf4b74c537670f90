//! Surface contact state.
//!
//! Colliders carry a [`SurfaceKind`]. The physics backend turns its collision
//! start/stop notifications into [`SurfaceContactEvent`]s, which update the
//! actor's [`SurfaceContact`].

use bevy::prelude::*;

/// The kind of surface a collider presents to the actor.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[reflect(Component)]
pub enum SurfaceKind {
    /// Normal footing.
    #[default]
    Normal,
    /// Footing that suppresses locomotion.
    Slippery,
}

/// Whether a contact started or ended.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Exit,
}

/// A collision between an actor and a tagged surface started or ended.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContactEvent {
    /// The controlled actor.
    pub actor: Entity,
    /// The surface collider.
    pub surface: Entity,
    /// Kind of the surface collider.
    pub kind: SurfaceKind,
    /// Enter or exit.
    pub phase: ContactPhase,
}

/// Surface contact flags of an actor.
///
/// Exit of any slippery surface clears the flag, even if another slippery
/// collider is still touching.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct SurfaceContact {
    /// Currently on a slippery surface.
    pub on_slippery_surface: bool,
}

impl SurfaceContact {
    /// Handle a contact start.
    pub fn on_surface_enter(&mut self, kind: SurfaceKind) {
        if kind == SurfaceKind::Slippery {
            self.on_slippery_surface = true;
        }
    }

    /// Handle a contact end.
    pub fn on_surface_exit(&mut self, kind: SurfaceKind) {
        if kind == SurfaceKind::Slippery {
            self.on_slippery_surface = false;
        }
    }

    /// Apply enter or exit.
    pub fn apply(&mut self, kind: SurfaceKind, phase: ContactPhase) {
        match phase {
            ContactPhase::Enter => self.on_surface_enter(kind),
            ContactPhase::Exit => self.on_surface_exit(kind),
        }
    }
}

/// Apply surface contact events to the actors they concern.
pub fn apply_surface_contacts(
    mut events: EventReader<SurfaceContactEvent>,
    mut q_actors: Query<&mut SurfaceContact>,
) {
    for event in events.read() {
        if let Ok(mut contact) = q_actors.get_mut(event.actor) {
            contact.apply(event.kind, event.phase);
        }
    }
}
