#![warn(missing_docs)]

//! Shared logging helpers and CLI argument definitions for the shortcut-cycle workspace.
//!
//! Binaries flatten [`LogArgs`] into their CLI, turn it into a filter spec
//! with [`compute_spec`], and install a subscriber with
//! [`env_filter_from_spec`].

use std::env;

use clap::Args;
use tracing_subscriber::EnvFilter;

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "cycle_engine=trace,cycle_core=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter spec for these flags. See [`compute_spec`].
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &[
        "cycle_sim",
        "cycle_engine",
        "cycle_core",
        "cycle_config",
        "cycle_keys",
        "logging",
    ]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info"))
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(
            compute_spec(true, false, Some("warn"), Some("cycle_engine=trace")),
            "cycle_engine=trace"
        );
    }

    #[test]
    fn level_applies_to_every_crate() {
        let spec = compute_spec(false, false, Some("WARN"), None);
        for krate in our_crates() {
            assert!(spec.contains(&format!("{krate}=warn")), "{spec}");
        }
        assert_eq!(spec.split(',').count(), our_crates().len());
    }

    #[test]
    fn trace_beats_debug() {
        let args = LogArgs {
            trace: true,
            debug: true,
            ..LogArgs::default()
        };
        assert!(args.spec().starts_with("cycle_sim=trace"));
    }
}
