//! Command-line interface definitions for cycle-sim.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use logging::LogArgs;

/// Command-line interface for the `cycle-sim` binary.
#[derive(Parser, Debug)]
#[command(
    name = "cycle-sim",
    about = "Replay a scripted shortcut interaction against the cycling engine",
    version
)]
pub struct Cli {
    /// Logging controls shared across workspace binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Configuration file (RON). Defaults to ~/.shortcut-cycle/config.ron.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Interaction script (RON).
    #[arg(long, value_name = "PATH")]
    pub script: PathBuf,

    /// Time to let pending timers run after the last step.
    #[arg(
        long,
        value_parser = humantime::parse_duration,
        default_value = "2s",
        value_name = "DURATION"
    )]
    pub settle: Duration,

    /// Run against the wall clock instead of simulated time.
    #[arg(long)]
    pub realtime: bool,
}
