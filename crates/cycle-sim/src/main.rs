#![warn(missing_docs)]

//! Entry point for the `cycle-sim` binary.

mod cli;
mod error;
mod script;
mod sim;
mod world;

use std::process;

use clap::Parser;
use tokio::runtime::Builder;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{cli::Cli, error::Result};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {}", err.pretty());
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and replay the script.
fn run() -> Result<()> {
    let cli = Cli::parse();
    let log_spec = cli.log.spec();
    let env_filter = logging::env_filter_from_spec(&log_spec);
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    let config_path = cycle_config::resolve_config_path(cli.config.as_deref())?;
    let config = cycle_config::load_from_path(&config_path)?;
    let script = script::load(&cli.script)?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .start_paused(!cli.realtime)
        .build()?;
    let transcript = runtime.block_on(sim::run(&config, script, cli.settle))?;
    for entry in &transcript {
        println!("{entry}");
    }
    Ok(())
}
