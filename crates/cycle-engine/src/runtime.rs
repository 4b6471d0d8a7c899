//! Confined execution context for the controller.
//!
//! The controller and its timers live on a single tokio task. Shortcut
//! callbacks, event monitors, and the overlay talk to it through a cloneable
//! [`ControllerHandle`]; timer firings come back through the same channel, so
//! every state transition is applied in arrival order.

use std::sync::Arc;

use cycle_core::{CandidateId, GroupId};
use tokio::{
    sync::mpsc::{self, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    Error, Result,
    clock::Clock,
    controller::Controller,
    event::{Command, InputEvent, TriggerRequest},
    services::Services,
    ticker::TokioTimers,
    timing::TimingConfig,
};

/// Cloneable sender into a running controller.
#[derive(Clone, Debug)]
pub struct ControllerHandle {
    /// Command channel.
    tx: UnboundedSender<Command>,
}

impl ControllerHandle {
    /// Deliver a raw command.
    pub fn send(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd).map_err(|_| Error::ChannelClosed)
    }

    /// A group shortcut fired.
    pub fn trigger(&self, group: impl Into<GroupId>) -> Result<()> {
        self.send(Command::Trigger(TriggerRequest::new(group.into())))
    }

    /// A group shortcut fired and the overlay should show at once.
    pub fn trigger_now(&self, group: impl Into<GroupId>) -> Result<()> {
        self.send(Command::Trigger(TriggerRequest::immediate(group.into())))
    }

    /// Forward monitored input.
    pub fn input(&self, ev: InputEvent) -> Result<()> {
        self.send(Command::Input(ev))
    }

    /// The overlay reported a click.
    pub fn user_select(&self, id: CandidateId) -> Result<()> {
        self.send(Command::UserSelect(id))
    }

    /// End the interaction, activating the pending candidate.
    pub fn dismiss(&self) -> Result<()> {
        self.send(Command::Dismiss)
    }

    /// End the interaction without activating.
    pub fn cancel(&self) -> Result<()> {
        self.send(Command::Cancel)
    }

    /// Stop the controller task.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// True once the controller task has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawn a controller on the current tokio runtime.
///
/// The task runs until [`ControllerHandle::shutdown`] is called or every
/// handle is dropped. Errors from individual commands are logged and do not
/// stop the task.
pub fn spawn_controller(
    services: Services,
    timing: TimingConfig,
    clock: Arc<dyn Clock>,
) -> (ControllerHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let timers = TokioTimers::new(&tx);
    let handle = ControllerHandle { tx };

    let task = tokio::spawn(async move {
        let mut controller = Controller::new(services, timing, clock, Box::new(timers));
        debug!(?timing, "controller_start");
        while let Some(cmd) = rx.recv().await {
            let shutdown = matches!(cmd, Command::Shutdown);
            if let Err(e) = controller.handle(cmd) {
                warn!(error = %e, "controller_command_failed");
            }
            if shutdown {
                break;
            }
        }
        controller.cancel();
        debug!("controller_stop");
    });
    (handle, task)
}
