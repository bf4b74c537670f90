//! Session state shared by dialog scripts.

use bevy::prelude::*;

/// A dialog choice was picked.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceMade {
    /// Index of the picked choice within its dialog.
    pub choice: usize,
}

/// Choices made during this session, oldest first.
#[derive(Resource, Reflect, Debug, Clone, Default)]
#[reflect(Resource)]
pub struct ChoiceLog {
    choices: Vec<usize>,
}

impl ChoiceLog {
    /// Append a choice.
    pub fn record(&mut self, choice: usize) {
        self.choices.push(choice);
    }

    /// All recorded choices.
    pub fn choices(&self) -> &[usize] {
        &self.choices
    }

    /// The most recent choice.
    pub fn last(&self) -> Option<usize> {
        self.choices.last().copied()
    }

    /// Forget every choice, e.g. when a new game starts.
    pub fn clear(&mut self) {
        self.choices.clear();
    }
}

/// Append each [`ChoiceMade`] to the [`ChoiceLog`].
pub fn record_choices(mut events: EventReader<ChoiceMade>, mut log: ResMut<ChoiceLog>) {
    for event in events.read() {
        log.record(event.choice);
        info!("Choice saved: {}", event.choice);
    }
}
