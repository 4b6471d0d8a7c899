use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the cycling engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The trigger named a group the supply does not know.
    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    /// The controller's command channel has been closed.
    #[error("Controller channel closed")]
    ChannelClosed,

    /// The workspace failed to bring a candidate forward.
    #[error("Activation of {id} failed: {message}")]
    Activation {
        /// Composite id of the candidate.
        id: String,
        /// Collaborator supplied reason.
        message: String,
    },

    /// Errors from the core model.
    #[error("Core error: {0}")]
    Core(#[from] cycle_core::Error),
}
