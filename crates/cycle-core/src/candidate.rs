//! Cyclable candidates and their composite identifiers.
//!
//! A candidate id encodes the application's stable identifier, and optionally
//! the process id and window index:
//!
//! - `com.example.App` for an application that is not running
//! - `com.example.App::412` for one running process
//! - `com.example.App::412::w1` for the second window of that process

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Group};

/// Separator between the components of a composite id.
pub const ID_SEPARATOR: &str = "::";

/// Prefix marking the window component of a composite id.
const WINDOW_PREFIX: char = 'w';

/// Borrowed view over the components of any stored identifier.
///
/// Parsing is lenient: anything that does not look like a process or window
/// suffix is treated as having no such component, so legacy values that
/// predate the suffixes still resolve by stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParts<'a> {
    /// Stable application identifier.
    pub stable: &'a str,
    /// Process id, when encoded.
    pub pid: Option<i32>,
    /// Window index, when encoded.
    pub window: Option<usize>,
}

impl<'a> IdParts<'a> {
    /// Split `raw` into its components.
    pub fn parse(raw: &'a str) -> Self {
        let mut it = raw.split(ID_SEPARATOR);
        let stable = it.next().unwrap_or_default();
        let pid = it.next().and_then(|p| p.parse::<i32>().ok());
        let window = match pid {
            Some(_) => it
                .next()
                .and_then(|w| w.strip_prefix(WINDOW_PREFIX))
                .and_then(|w| w.parse::<usize>().ok()),
            None => None,
        };
        Self {
            stable,
            pid,
            window,
        }
    }
}

/// Composite identifier of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    /// Identifier of an application that is not running.
    pub fn app(stable: &str) -> Self {
        Self(stable.to_string())
    }

    /// Identifier of one running process.
    pub fn process(stable: &str, pid: i32) -> Self {
        Self(format!("{stable}{ID_SEPARATOR}{pid}"))
    }

    /// Identifier of one window of a running process.
    pub fn window(stable: &str, pid: i32, index: usize) -> Self {
        Self(format!(
            "{stable}{ID_SEPARATOR}{pid}{ID_SEPARATOR}{WINDOW_PREFIX}{index}"
        ))
    }

    /// The raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Components of this id.
    pub fn parts(&self) -> IdParts<'_> {
        IdParts::parse(&self.0)
    }

    /// Stable application identifier component.
    pub fn stable_id(&self) -> &str {
        self.parts().stable
    }
}

impl FromStr for CandidateId {
    type Err = Error;

    /// Strict parse: every suffix present must be well formed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidCandidateId(s.to_string());
        let segments: Vec<&str> = s.split(ID_SEPARATOR).collect();
        match segments.as_slice() {
            [stable] if !stable.is_empty() => Ok(Self::app(stable)),
            [stable, pid] if !stable.is_empty() => {
                let pid = pid.parse::<i32>().map_err(|_| invalid())?;
                Ok(Self::process(stable, pid))
            }
            [stable, pid, win] if !stable.is_empty() => {
                let pid = pid.parse::<i32>().map_err(|_| invalid())?;
                let index = win
                    .strip_prefix(WINDOW_PREFIX)
                    .and_then(|w| w.parse::<usize>().ok())
                    .ok_or_else(invalid)?;
                Ok(Self::window(stable, pid, index))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CandidateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One cyclable unit: a non-running app, a process, or a single window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Composite identifier, unique within one candidate set.
    pub id: CandidateId,
    /// Stable application identifier (bundle id).
    pub stable_id: String,
    /// Process id for running candidates.
    pub pid: Option<i32>,
    /// Window index for per-window candidates.
    pub window: Option<usize>,
    /// Label shown in the overlay.
    pub name: String,
    /// Whether the underlying application is running.
    pub running: bool,
}

impl Candidate {
    /// A configured application with no running instance.
    pub fn not_running(stable: &str, name: &str) -> Self {
        Self {
            id: CandidateId::app(stable),
            stable_id: stable.to_string(),
            pid: None,
            window: None,
            name: name.to_string(),
            running: false,
        }
    }

    /// A running process.
    pub fn process(stable: &str, pid: i32, name: &str) -> Self {
        Self {
            id: CandidateId::process(stable, pid),
            stable_id: stable.to_string(),
            pid: Some(pid),
            window: None,
            name: name.to_string(),
            running: true,
        }
    }

    /// One window of a running process.
    pub fn window(stable: &str, pid: i32, index: usize, name: &str) -> Self {
        Self {
            id: CandidateId::window(stable, pid, index),
            stable_id: stable.to_string(),
            pid: Some(pid),
            window: Some(index),
            name: name.to_string(),
            running: true,
        }
    }
}

/// A running application instance as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningApp {
    /// Stable application identifier.
    pub bundle_id: String,
    /// Process id.
    pub pid: i32,
    /// Process display name.
    pub name: String,
    /// Titles of the process' standard windows, front to back.
    #[serde(default)]
    pub windows: Vec<String>,
}

/// Build the candidate set for `group` from a snapshot of running processes.
///
/// Candidates follow the group's configured app order; within one app,
/// processes keep their enumeration order. With `per_window`, each window of
/// a process becomes its own candidate (a process reporting no windows still
/// contributes one process candidate). Apps with no running instance are
/// included only when the group launches on demand. Processes of apps not in
/// the group are ignored.
pub fn enumerate_candidates(group: &Group, running: &[RunningApp], per_window: bool) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut seen: HashSet<CandidateId> = HashSet::new();
    for app in &group.apps {
        let mut instances = running
            .iter()
            .filter(|r| r.bundle_id == app.bundle_id)
            .peekable();
        if instances.peek().is_none() {
            if group.launch_if_needed {
                out.push(Candidate::not_running(&app.bundle_id, &app.name));
            }
            continue;
        }
        for inst in instances {
            if per_window && !inst.windows.is_empty() {
                for (index, title) in inst.windows.iter().enumerate() {
                    let label = if title.is_empty() {
                        app.name.clone()
                    } else {
                        format!("{}: {}", app.name, title)
                    };
                    let cand = Candidate::window(&app.bundle_id, inst.pid, index, &label);
                    if seen.insert(cand.id.clone()) {
                        out.push(cand);
                    }
                }
            } else {
                let cand = Candidate::process(&app.bundle_id, inst.pid, &app.name);
                if seen.insert(cand.id.clone()) {
                    out.push(cand);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppDescriptor, GroupId};

    fn group(launch_if_needed: bool) -> Group {
        Group::new(
            GroupId::from("browsers"),
            "Browsers",
            vec![
                AppDescriptor::new("com.a", "Alpha"),
                AppDescriptor::new("com.b", "Beta"),
                AppDescriptor::new("com.c", "Gamma"),
            ],
            launch_if_needed,
        )
    }

    fn running(bundle: &str, pid: i32, windows: &[&str]) -> RunningApp {
        RunningApp {
            bundle_id: bundle.into(),
            pid,
            name: bundle.into(),
            windows: windows.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn id_formats() {
        assert_eq!(CandidateId::app("com.a").as_str(), "com.a");
        assert_eq!(CandidateId::process("com.a", 7).as_str(), "com.a::7");
        assert_eq!(CandidateId::window("com.a", 7, 2).as_str(), "com.a::7::w2");
    }

    #[test]
    fn parts_are_lenient() {
        let p = IdParts::parse("com.a::7::w2");
        assert_eq!((p.stable, p.pid, p.window), ("com.a", Some(7), Some(2)));
        let p = IdParts::parse("com.a::junk::w2");
        assert_eq!((p.stable, p.pid, p.window), ("com.a", None, None));
        let p = IdParts::parse("com.a");
        assert_eq!((p.stable, p.pid, p.window), ("com.a", None, None));
    }

    #[test]
    fn strict_parse() {
        assert_eq!(
            "com.a::7::w2".parse::<CandidateId>(),
            Ok(CandidateId::window("com.a", 7, 2))
        );
        assert!("com.a::x".parse::<CandidateId>().is_err());
        assert!("com.a::7::2".parse::<CandidateId>().is_err());
        assert!("".parse::<CandidateId>().is_err());
    }

    #[test]
    fn enumerate_running_only() {
        let run = vec![running("com.c", 30, &[]), running("com.a", 10, &[]), running("org.x", 1, &[])];
        let ids: Vec<String> = enumerate_candidates(&group(false), &run, false)
            .into_iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(ids, vec!["com.a::10", "com.c::30"]);
    }

    #[test]
    fn enumerate_with_launch_includes_idle_apps() {
        let run = vec![running("com.b", 20, &[]), running("com.b", 21, &[])];
        let cands = enumerate_candidates(&group(true), &run, false);
        let ids: Vec<&str> = cands.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["com.a", "com.b::20", "com.b::21", "com.c"]);
        assert!(!cands[0].running);
        assert!(cands[1].running);
    }

    #[test]
    fn enumerate_per_window() {
        let run = vec![running("com.a", 10, &["one", "two"]), running("com.b", 20, &[])];
        let cands = enumerate_candidates(&group(false), &run, true);
        let ids: Vec<&str> = cands.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["com.a::10::w0", "com.a::10::w1", "com.b::20"]);
        assert_eq!(cands[1].name, "Alpha: two");
    }
}
