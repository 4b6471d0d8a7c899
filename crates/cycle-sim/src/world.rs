//! In-memory OS stand-in for the simulator.
//!
//! One `SimWorld` plays every collaborator the controller needs and records
//! what the controller did to it as a [`Transcript`].

use std::{
    collections::{HashMap, HashSet},
    fmt,
    time::Duration,
};

use cycle_config::Config;
use cycle_core::{
    Candidate, CandidateId, Group, GroupId, IdParts, RunningApp, enumerate_candidates,
};
use cycle_engine::{
    CandidateSupply, Error as EngineError, EventMonitor, KeyProbe, MonitorSpec, OverlayRenderer,
    Result as EngineResult, Workspace,
};
use cycle_keys::{Key, ModifierSet};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Something the controller did, stamped with simulated time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Overlay drawn.
    Present {
        /// Time since start.
        at: Duration,
        /// Candidate labels, in order.
        labels: Vec<String>,
        /// Position of the highlighted candidate.
        selected: Option<usize>,
    },
    /// Overlay removed.
    Hide {
        /// Time since start.
        at: Duration,
    },
    /// A candidate was brought forward.
    Activate {
        /// Time since start.
        at: Duration,
        /// Composite id activated.
        id: String,
        /// True when the app had to be launched.
        launched: bool,
    },
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present {
                at,
                labels,
                selected,
            } => {
                let items: Vec<String> = labels
                    .iter()
                    .enumerate()
                    .map(|(i, l)| {
                        if Some(i) == *selected {
                            format!("[{}]", l)
                        } else {
                            l.clone()
                        }
                    })
                    .collect();
                write!(f, "{:>6}ms present  {}", at.as_millis(), items.join("  "))
            }
            Self::Hide { at } => write!(f, "{:>6}ms hide", at.as_millis()),
            Self::Activate { at, id, launched } => {
                let verb = if *launched { "launch" } else { "activate" };
                write!(f, "{:>6}ms {:<8} {}", at.as_millis(), verb, id)
            }
        }
    }
}

/// Everything recorded during a run.
pub type Transcript = Vec<Entry>;

/// Mutable world state.
#[derive(Debug)]
struct State {
    /// Groups with their remembered state.
    groups: HashMap<GroupId, Group>,
    /// Process table.
    running: Vec<RunningApp>,
    /// Focused composite id.
    frontmost: Option<String>,
    /// Physically held keys.
    keys: HashSet<Key>,
    /// Physically held modifiers.
    modifiers: ModifierSet,
    /// Monitors installed.
    monitoring: bool,
    /// Recorded entries.
    transcript: Transcript,
}

/// Simulated OS.
#[derive(Debug)]
pub struct SimWorld {
    /// Shared state.
    state: Mutex<State>,
    /// Per-window enumeration.
    per_window: bool,
    /// Start of the run.
    start: Instant,
}

impl SimWorld {
    /// World with the configured groups and an initial process table.
    pub fn new(config: &Config, running: Vec<RunningApp>, frontmost: Option<String>) -> Self {
        let groups = config
            .groups()
            .iter()
            .map(|g| (g.id.clone(), g.clone()))
            .collect();
        Self {
            state: Mutex::new(State {
                groups,
                running,
                frontmost,
                keys: HashSet::new(),
                modifiers: ModifierSet::EMPTY,
                monitoring: false,
                transcript: Vec::new(),
            }),
            per_window: config.per_window(),
            start: Instant::now(),
        }
    }

    /// Time since the world was created.
    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.start)
    }

    /// Mark `key` held or released.
    pub fn set_key(&self, key: Key, down: bool) {
        let mut st = self.state.lock();
        if down {
            st.keys.insert(key);
        } else {
            st.keys.remove(&key);
        }
    }

    /// Replace the held modifiers.
    pub fn set_modifiers(&self, mods: ModifierSet) {
        self.state.lock().modifiers = mods;
    }

    /// Move focus.
    pub fn set_frontmost(&self, id: &str) {
        self.state.lock().frontmost = Some(id.to_string());
    }

    /// Terminate a process, dropping focus if it had it.
    pub fn quit(&self, pid: i32) {
        let mut st = self.state.lock();
        st.running.retain(|r| r.pid != pid);
        let gone = st
            .frontmost
            .as_deref()
            .is_some_and(|f| IdParts::parse(f).pid == Some(pid));
        if gone {
            st.frontmost = None;
        }
    }

    /// Start a process.
    pub fn launch(&self, app: RunningApp) {
        self.state.lock().running.push(app);
    }

    /// Currently focused id.
    pub fn frontmost_id(&self) -> Option<String> {
        self.state.lock().frontmost.clone()
    }

    /// True while monitors are installed.
    pub fn is_monitoring(&self) -> bool {
        self.state.lock().monitoring
    }

    /// Everything recorded so far.
    pub fn transcript(&self) -> Transcript {
        self.state.lock().transcript.clone()
    }

    /// Append an entry.
    fn record(&self, entry: Entry) {
        self.state.lock().transcript.push(entry);
    }
}

impl CandidateSupply for SimWorld {
    fn group(&self, id: &GroupId) -> Option<Group> {
        self.state.lock().groups.get(id).cloned()
    }

    fn live_candidates(&self, group: &Group) -> Vec<Candidate> {
        enumerate_candidates(group, &self.state.lock().running, self.per_window)
    }

    fn set_last_active_id(&self, id: &GroupId, value: &str) {
        if let Some(g) = self.state.lock().groups.get_mut(id) {
            g.last_active_id = Some(value.to_string());
        }
    }

    fn set_mru_order(&self, id: &GroupId, order: Vec<String>) {
        if let Some(g) = self.state.lock().groups.get_mut(id) {
            g.mru = order;
        }
    }
}

impl Workspace for SimWorld {
    fn frontmost(&self) -> Option<String> {
        self.frontmost_id()
    }

    fn activate_or_launch(&self, candidate: &Candidate, launch: bool) -> EngineResult<()> {
        let at = self.elapsed();
        let focused = {
            let mut st = self.state.lock();
            if candidate.running {
                let alive = st.running.iter().any(|r| Some(r.pid) == candidate.pid);
                if !alive {
                    return Err(EngineError::Activation {
                        id: candidate.id.to_string(),
                        message: "process exited".into(),
                    });
                }
                candidate.id.to_string()
            } else if launch {
                let pid = st.running.iter().map(|r| r.pid).max().unwrap_or(1000) + 1;
                st.running.push(RunningApp {
                    bundle_id: candidate.stable_id.clone(),
                    pid,
                    name: candidate.name.clone(),
                    windows: Vec::new(),
                });
                CandidateId::process(&candidate.stable_id, pid).to_string()
            } else {
                return Err(EngineError::Activation {
                    id: candidate.id.to_string(),
                    message: "not running".into(),
                });
            }
        };
        debug!(id = %focused, "sim_focus");
        self.state.lock().frontmost = Some(focused.clone());
        self.record(Entry::Activate {
            at,
            id: focused,
            launched: !candidate.running,
        });
        Ok(())
    }
}

impl OverlayRenderer for SimWorld {
    fn present(&self, candidates: &[Candidate], selected: Option<&CandidateId>, _label: &str) {
        let selected = selected.and_then(|id| candidates.iter().position(|c| c.id == *id));
        self.record(Entry::Present {
            at: self.elapsed(),
            labels: candidates.iter().map(|c| c.name.clone()).collect(),
            selected,
        });
    }

    fn hide(&self) {
        self.record(Entry::Hide { at: self.elapsed() });
    }
}

impl KeyProbe for SimWorld {
    fn is_key_down(&self, key: Key) -> bool {
        self.state.lock().keys.contains(&key)
    }

    fn modifiers(&self) -> ModifierSet {
        self.state.lock().modifiers
    }
}

impl EventMonitor for SimWorld {
    fn install(&self, spec: MonitorSpec) {
        debug!(required = %spec.required, "sim_monitor_install");
        self.state.lock().monitoring = true;
    }

    fn remove_all(&self) {
        self.state.lock().monitoring = false;
    }
}
