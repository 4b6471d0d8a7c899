//! Error handling for the cycle-sim crate.

use std::{io, path::PathBuf, result};

use thiserror::Error;

/// Convenient result type for cycle-sim operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Configuration parsing or resolution errors.
    #[error("Configuration error: {0}")]
    Config(#[from] cycle_config::Error),
    /// Errors surfaced by the controller.
    #[error("Engine error: {0}")]
    Engine(#[from] cycle_engine::Error),
    /// The script could not be read or parsed.
    #[error("Script error in {}: {message}", path.display())]
    Script {
        /// Script file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
    /// Generic error for unexpected conditions.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Render the error for the terminal, with config excerpts when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Config(e) => e.pretty(),
            other => other.to_string(),
        }
    }
}
