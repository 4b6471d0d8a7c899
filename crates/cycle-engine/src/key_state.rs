//! Trigger-key hold detection.
//!
//! Combines hardware key state with two heartbeat timestamps so the loop can
//! tell a held key from a released one when either signal alone is missing.

use std::time::{Duration, Instant};

use cycle_keys::ModifierSet;

/// Tracks the signals that say whether the trigger key is still held.
///
/// Hardware polling alone is unreliable under sandboxing and repeat
/// suppression, so two heartbeats are kept alongside it: the last time the
/// global shortcut fired, and the last local key event for the tracked key.
#[derive(Debug, Default, Clone)]
pub struct HoldTracker {
    /// Last global shortcut trigger.
    global: Option<Instant>,
    /// Last local key-down (including auto-repeat) for the tracked key.
    local: Option<Instant>,
    /// Modifiers from the most recent modifier-change event.
    modifiers: Option<ModifierSet>,
}

impl HoldTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a global trigger heartbeat.
    pub fn note_global(&mut self, now: Instant) {
        self.global = Some(now);
    }

    /// Record a local key heartbeat.
    pub fn note_local(&mut self, now: Instant) {
        self.local = Some(now);
    }

    /// Record the modifiers reported by an event.
    pub fn note_modifiers(&mut self, mods: ModifierSet) {
        self.modifiers = Some(mods);
    }

    /// Modifiers last reported by an event, if any arrived.
    pub fn modifiers(&self) -> Option<ModifierSet> {
        self.modifiers
    }

    /// True when either heartbeat is younger than `window`.
    pub fn recent(&self, now: Instant, window: Duration) -> bool {
        let fresh = |t: Option<Instant>| t.is_some_and(|t| now.saturating_duration_since(t) <= window);
        fresh(self.global) || fresh(self.local)
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
