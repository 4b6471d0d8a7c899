//! Timer identities and generation bookkeeping.
//!
//! The controller owns at most one live instance of each [`TimerKind`].
//! Arming a kind bumps its generation, so a firing that was already in flight
//! for the previous instance no longer matches and is dropped.

use std::time::Duration;

/// The three timers the controller can have running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Delay between a trigger and presenting the overlay.
    ShowDelay,
    /// Periodic auto-advance while the trigger key is held.
    LoopRepeat,
    /// Overlay timeout for shortcuts with no modifiers to release.
    AutoHide,
}

impl TimerKind {
    /// All kinds.
    pub const ALL: [Self; 3] = [Self::ShowDelay, Self::LoopRepeat, Self::AutoHide];

    /// Slot index inside [`TimerSet`].
    const fn slot(self) -> usize {
        match self {
            Self::ShowDelay => 0,
            Self::LoopRepeat => 1,
            Self::AutoHide => 2,
        }
    }
}

/// Identifies one armed timer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    /// Which timer.
    pub kind: TimerKind,
    /// Generation of this instance.
    pub generation: u64,
}

/// Schedules timer firings back to the controller.
///
/// Implementations deliver the token once after `delay` and then every
/// `period` until cancelled. Arming a kind replaces any running instance of
/// that kind.
pub trait TimerDriver: Send {
    /// Arm `token`.
    fn arm(&mut self, token: TimerToken, delay: Duration, period: Option<Duration>);
    /// Cancel the running instance of `kind`, if any. Idempotent.
    fn cancel(&mut self, kind: TimerKind);
}

/// Generation bookkeeping for the controller's timers.
#[derive(Debug, Default)]
pub struct TimerSet {
    /// Last generation handed out.
    generation: u64,
    /// Current generation per kind, `None` when not armed.
    armed: [Option<u64>; 3],
}

impl TimerSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh token for `kind`, superseding any previous instance.
    pub fn arm(&mut self, kind: TimerKind) -> TimerToken {
        self.generation += 1;
        self.armed[kind.slot()] = Some(self.generation);
        TimerToken {
            kind,
            generation: self.generation,
        }
    }

    /// Forget `kind`. Returns true when it was armed.
    pub fn clear(&mut self, kind: TimerKind) -> bool {
        self.armed[kind.slot()].take().is_some()
    }

    /// True when `kind` has a live instance.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed[kind.slot()].is_some()
    }

    /// True when `token` is the live instance of its kind.
    pub fn is_current(&self, token: TimerToken) -> bool {
        self.armed[token.kind.slot()] == Some(token.generation)
    }
}
