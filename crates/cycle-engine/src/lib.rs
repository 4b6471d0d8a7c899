//! Cycle Engine
//!
//! The cycle engine turns shortcut presses into app switches:
//! - decides when the selection overlay appears (show delay, peek, quick tap)
//! - auto-advances the selection while the trigger key is held
//! - activates the pending candidate when the shortcut is released
//! - keeps each group's last active id and MRU order current
//!
//! It exposes a small API:
//! - [`Controller`]: the synchronous state machine
//! - [`spawn_controller`] and [`ControllerHandle`]: the controller confined
//!   to one tokio task with tokio-backed timers
//! - the collaborator traits in [`deps`], implemented by the host
//!
//! [`test_support`] carries in-memory doubles for every collaborator.

mod clock;
mod controller;
pub mod deps;
mod error;
mod event;
mod key_state;
mod runtime;
mod services;
mod ticker;
pub mod test_support;
mod timers;
pub mod timing;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use controller::{Controller, Phase};
pub use deps::{CandidateSupply, EventMonitor, KeyProbe, MonitorSpec, OverlayRenderer, Workspace};
pub use error::{Error, Result};
pub use event::{Command, InputEvent, TriggerRequest};
pub use runtime::{ControllerHandle, spawn_controller};
pub use services::Services;
pub use ticker::TokioTimers;
pub use timers::{TimerDriver, TimerKind, TimerSet, TimerToken};
pub use timing::TimingConfig;
