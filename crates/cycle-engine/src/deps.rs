//! Collaborator interfaces the controller drives.
//!
//! Everything that touches the OS (process enumeration, focus changes, key
//! state, event taps, drawing) sits behind one of these traits so the
//! controller can run against test doubles.

use cycle_core::{Candidate, CandidateId, Group, GroupId};
use cycle_keys::{Key, ModifierSet};

use crate::Result;

/// Supplies group configuration, live candidates, and remembered state.
pub trait CandidateSupply: Send + Sync {
    /// Snapshot of a group's configuration and remembered state.
    fn group(&self, id: &GroupId) -> Option<Group>;

    /// Synchronous snapshot of the group's live candidates, in configured order.
    fn live_candidates(&self, group: &Group) -> Vec<Candidate>;

    /// Remembered last active id.
    fn last_active_id(&self, id: &GroupId) -> Option<String> {
        self.group(id).and_then(|g| g.last_active_id)
    }

    /// Remembered MRU order.
    fn mru_order(&self, id: &GroupId) -> Vec<String> {
        self.group(id).map(|g| g.mru).unwrap_or_default()
    }

    /// Persist the last active id.
    fn set_last_active_id(&self, id: &GroupId, value: &str);

    /// Persist the MRU order.
    fn set_mru_order(&self, id: &GroupId, order: Vec<String>);

    /// Modifiers of the group's shortcut; their release ends an interaction.
    fn required_modifiers(&self, id: &GroupId) -> Option<ModifierSet> {
        self.group(id).and_then(|g| g.shortcut).map(|c| c.modifiers)
    }

    /// Non-modifier key of the group's shortcut, tracked for hold-to-loop.
    fn trigger_key(&self, id: &GroupId) -> Option<Key> {
        self.group(id).and_then(|g| g.shortcut).map(|c| c.key)
    }
}

/// OS focus and activation.
pub trait Workspace: Send + Sync {
    /// Composite id of the frontmost process or window, if known.
    fn frontmost(&self) -> Option<String>;

    /// Bring `candidate` forward, launching it when it is not running and
    /// `launch` is set.
    fn activate_or_launch(&self, candidate: &Candidate, launch: bool) -> Result<()>;
}

/// Draws the selection overlay.
pub trait OverlayRenderer: Send + Sync {
    /// Render the overlay. Called once per selection change.
    fn present(&self, candidates: &[Candidate], selected: Option<&CandidateId>, shortcut_label: &str);

    /// Remove the overlay.
    fn hide(&self);
}

/// Hardware key state.
pub trait KeyProbe: Send + Sync {
    /// True when `key` is physically held.
    fn is_key_down(&self, key: Key) -> bool;

    /// Currently held modifiers.
    fn modifiers(&self) -> ModifierSet;
}

/// What an installed monitor should forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSpec {
    /// Modifiers whose release ends the interaction.
    pub required: ModifierSet,
    /// Key tracked for release and hold detection.
    pub trigger_key: Option<Key>,
}

/// Installs and removes the event taps feeding [`crate::InputEvent`]s.
pub trait EventMonitor: Send + Sync {
    /// Start forwarding key, modifier and focus events.
    fn install(&self, spec: MonitorSpec);

    /// Stop forwarding. Idempotent.
    fn remove_all(&self);
}
