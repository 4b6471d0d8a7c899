//! Scripted interactions.
//!
//! A script sets up the simulated process table and then lists the steps to
//! replay, for example:
//!
//! ```ron
//! (
//!     running: [(bundle_id: "com.apple.Safari", pid: 100, name: "Safari")],
//!     frontmost: "com.apple.Safari::100",
//!     steps: [Modifiers("opt"), Trigger("browsers"), KeyUp("tab"), Wait(300), Modifiers("")],
//! )
//! ```

use std::{fs, path::Path, result::Result as StdResult};

use cycle_core::{CandidateId, RunningApp};
use cycle_keys::{Chord, Key, ModifierSet};
use serde::Deserialize;

use crate::error::{Error, Result};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Step {
    /// Fire a group's shortcut.
    Trigger(String),
    /// Fire a group's shortcut and show the overlay at once.
    TriggerNow(String),
    /// Fire whichever group is bound to this chord, e.g. `"opt+tab"`.
    Shortcut(Chord),
    /// Press a key.
    KeyDown(Key),
    /// OS auto-repeat of a held key.
    KeyRepeat(Key),
    /// Release a key.
    KeyUp(Key),
    /// Replace the set of held modifiers, e.g. `"cmd+shift"` or `""`.
    Modifiers(ModifierSet),
    /// Click a candidate in the overlay.
    Click(CandidateId),
    /// Move OS focus to a composite id.
    Focus(String),
    /// The controlling app lost focus.
    FocusLost,
    /// Terminate the process with this pid.
    Quit(i32),
    /// Start a process.
    Launch(RunningApp),
    /// Let time pass, in milliseconds.
    Wait(u64),
    /// End the interaction, activating the pending candidate.
    Dismiss,
    /// End the interaction without activating.
    Cancel,
}

/// Helper: accept either a plain string or an Option<String>.
fn de_opt_string<'de, D>(deserializer: D) -> StdResult<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        S(String),
        Opt(Option<String>),
    }
    match Helper::deserialize(deserializer)? {
        Helper::S(s) => Ok(Some(s)),
        Helper::Opt(o) => Ok(o),
    }
}

/// A full script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Processes running when the script starts.
    #[serde(default)]
    pub running: Vec<RunningApp>,
    /// Composite id of the initially focused process.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub frontmost: Option<String>,
    /// Steps in order.
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from RON source.
    pub fn from_ron_str(source: &str) -> StdResult<Self, String> {
        ron::from_str(source).map_err(|e| {
            format!(
                "{}:{}: {}",
                e.span.start.line, e.span.start.col, e.code
            )
        })
    }
}

/// Read and parse the script at `path`.
pub fn load(path: &Path) -> Result<Script> {
    let source = fs::read_to_string(path).map_err(|e| Error::Script {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Script::from_ron_str(&source).map_err(|message| Error::Script {
        path: path.to_path_buf(),
        message,
    })
}
