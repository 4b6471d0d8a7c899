//! Configuration for the shortcut switcher.
//!
//! The file is RON and looks like:
//!
//! ```ron
//! (
//!     timing: (show_delay_ms: 250),
//!     per_window: false,
//!     groups: [
//!         (
//!             id: "browsers",
//!             shortcut: "opt+tab",
//!             launch_if_needed: true,
//!             order: recent_first,
//!             apps: [
//!                 (bundle_id: "com.apple.Safari", name: "Safari"),
//!                 (bundle_id: "org.mozilla.firefox"),
//!             ],
//!         ),
//!     ],
//! )
//! ```
//!
//! Every section is optional. Timing values are clamped into the ranges the
//! engine accepts.

use std::{
    env,
    path::{Path, PathBuf},
};

mod config;
mod error;
mod loader;
mod raw;

pub use config::Config;
pub use error::Error;
pub use loader::{from_ron_str, load_from_path};

/// Determine the preferred user config path (`~/.shortcut-cycle/config.ron`).
pub fn default_config_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".shortcut-cycle");
    p.push("config.ron");
    p
}

/// Resolve the effective config path using the default policy.
///
/// Policy:
/// 1) Use `explicit` when provided.
/// 2) Else use `~/.shortcut-cycle/config.ron` when it exists.
/// 3) Else return a clear "no config found" error.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, Error> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let preferred = default_config_path();
    if preferred.exists() {
        return Ok(preferred);
    }

    Err(Error::Read {
        path: Some(preferred),
        message: "No config found. Create ~/.shortcut-cycle/config.ron".to_string(),
    })
}
