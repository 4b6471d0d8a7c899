//! Messages consumed by the controller.

use cycle_core::{CandidateId, GroupId};
use cycle_keys::{Key, ModifierSet};

use crate::timers::TimerToken;

/// Keyboard and focus events observed while an interaction is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The set of held modifiers changed.
    ModifiersChanged(ModifierSet),
    /// A key went down; `repeat` marks OS auto-repeat.
    KeyDown {
        /// The key.
        key: Key,
        /// True for auto-repeat events.
        repeat: bool,
    },
    /// A key was released.
    KeyUp {
        /// The key.
        key: Key,
    },
    /// The controlling app lost focus.
    FocusLost,
}

/// A shortcut activation for a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRequest {
    /// Group whose shortcut fired.
    pub group: GroupId,
    /// Present the overlay without waiting for the show delay.
    pub immediate: bool,
}

impl TriggerRequest {
    /// A normal trigger that waits for the show delay.
    pub fn new(group: GroupId) -> Self {
        Self {
            group,
            immediate: false,
        }
    }

    /// A trigger that shows the overlay at once.
    pub fn immediate(group: GroupId) -> Self {
        Self {
            group,
            immediate: true,
        }
    }
}

/// Everything delivered onto the controller's confined context.
#[derive(Debug, Clone)]
pub enum Command {
    /// A group shortcut fired.
    Trigger(TriggerRequest),
    /// Keyboard or focus input.
    Input(InputEvent),
    /// The overlay reported a click on a candidate.
    UserSelect(CandidateId),
    /// End the interaction and activate the pending candidate.
    Dismiss,
    /// End the interaction without activating anything.
    Cancel,
    /// A timer fired.
    Timer(TimerToken),
    /// Stop the controller task.
    Shutdown,
}
