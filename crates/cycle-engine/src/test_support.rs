//! Test doubles for the controller's collaborators.
//! These helpers are public so integration tests and the simulator can share
//! them; they never touch the OS.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use cycle_core::{Candidate, CandidateId, Group, GroupId, RunningApp, enumerate_candidates};
use cycle_keys::{Key, ModifierSet};
use parking_lot::Mutex;

use crate::{
    Error, Result,
    clock::{Clock, ManualClock},
    controller::Controller,
    deps::{CandidateSupply, EventMonitor, KeyProbe, MonitorSpec, OverlayRenderer, Workspace},
    event::{Command, InputEvent, TriggerRequest},
    services::Services,
    timers::{TimerDriver, TimerKind, TimerToken},
    timing::TimingConfig,
};

/// In-memory groups over a simulated process table.
#[derive(Debug, Default)]
pub struct MockSupply {
    /// Groups by id, including remembered state.
    groups: Mutex<HashMap<GroupId, Group>>,
    /// Simulated running processes.
    running: Mutex<Vec<RunningApp>>,
    /// Expand processes into per-window candidates.
    per_window: bool,
}

impl MockSupply {
    /// Supply enumerating one candidate per process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply enumerating one candidate per window.
    pub fn per_window() -> Self {
        Self {
            per_window: true,
            ..Self::default()
        }
    }

    /// Add or replace a group.
    pub fn add_group(&self, group: Group) {
        self.groups.lock().insert(group.id.clone(), group);
    }

    /// Replace the process table.
    pub fn set_running(&self, running: Vec<RunningApp>) {
        *self.running.lock() = running;
    }

    /// Start a process.
    pub fn launch(&self, app: RunningApp) {
        self.running.lock().push(app);
    }

    /// Terminate a process.
    pub fn quit(&self, pid: i32) {
        self.running.lock().retain(|r| r.pid != pid);
    }
}

impl CandidateSupply for MockSupply {
    fn group(&self, id: &GroupId) -> Option<Group> {
        self.groups.lock().get(id).cloned()
    }

    fn live_candidates(&self, group: &Group) -> Vec<Candidate> {
        enumerate_candidates(group, &self.running.lock(), self.per_window)
    }

    fn set_last_active_id(&self, id: &GroupId, value: &str) {
        if let Some(g) = self.groups.lock().get_mut(id) {
            g.last_active_id = Some(value.to_string());
        }
    }

    fn set_mru_order(&self, id: &GroupId, order: Vec<String>) {
        if let Some(g) = self.groups.lock().get_mut(id) {
            g.mru = order;
        }
    }
}

/// Workspace that records activations and moves focus on success.
#[derive(Debug, Default)]
pub struct MockWorkspace {
    /// Composite id of the frontmost process.
    frontmost: Mutex<Option<String>>,
    /// Activated ids with their launch flag, in order.
    activations: Mutex<Vec<(String, bool)>>,
    /// Ids that fail to activate.
    failing: Mutex<HashSet<String>>,
}

impl MockWorkspace {
    /// Workspace with nothing frontmost.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frontmost id.
    pub fn set_frontmost(&self, id: Option<&str>) {
        *self.frontmost.lock() = id.map(str::to_string);
    }

    /// Make activation of `id` fail.
    pub fn fail_on(&self, id: &str) {
        self.failing.lock().insert(id.to_string());
    }

    /// Ids activated so far.
    pub fn activated(&self) -> Vec<String> {
        self.activations.lock().iter().map(|(id, _)| id.clone()).collect()
    }

    /// Activations with their launch flag.
    pub fn activations(&self) -> Vec<(String, bool)> {
        self.activations.lock().clone()
    }
}

impl Workspace for MockWorkspace {
    fn frontmost(&self) -> Option<String> {
        self.frontmost.lock().clone()
    }

    fn activate_or_launch(&self, candidate: &Candidate, launch: bool) -> Result<()> {
        let id = candidate.id.to_string();
        if self.failing.lock().contains(&id) {
            return Err(Error::Activation {
                id,
                message: "refused".into(),
            });
        }
        self.activations.lock().push((id.clone(), launch));
        *self.frontmost.lock() = Some(id);
        Ok(())
    }
}

/// Renderer that records every present and hide.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Selected id of each present call.
    presents: Mutex<Vec<Option<String>>>,
    /// Number of hide calls.
    hides: Mutex<usize>,
    /// Labels of the last present.
    last_labels: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of present calls.
    pub fn present_count(&self) -> usize {
        self.presents.lock().len()
    }

    /// Selection passed to each present call.
    pub fn selections(&self) -> Vec<Option<String>> {
        self.presents.lock().clone()
    }

    /// Number of hide calls.
    pub fn hide_count(&self) -> usize {
        *self.hides.lock()
    }

    /// Candidate labels from the most recent present.
    pub fn last_labels(&self) -> Vec<String> {
        self.last_labels.lock().clone()
    }
}

impl OverlayRenderer for RecordingRenderer {
    fn present(&self, candidates: &[Candidate], selected: Option<&CandidateId>, _label: &str) {
        self.presents.lock().push(selected.map(|id| id.to_string()));
        *self.last_labels.lock() = candidates.iter().map(|c| c.name.clone()).collect();
    }

    fn hide(&self) {
        *self.hides.lock() += 1;
    }
}

/// Settable hardware key state.
#[derive(Debug, Default)]
pub struct MockKeyProbe {
    /// Keys reported as held.
    down: Mutex<HashSet<Key>>,
    /// Modifiers reported as held.
    modifiers: Mutex<ModifierSet>,
}

impl MockKeyProbe {
    /// Nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `key` as held or released.
    pub fn set_down(&self, key: Key, down: bool) {
        let mut keys = self.down.lock();
        if down {
            keys.insert(key);
        } else {
            keys.remove(&key);
        }
    }

    /// Report `mods` as held.
    pub fn set_modifiers(&self, mods: ModifierSet) {
        *self.modifiers.lock() = mods;
    }
}

impl KeyProbe for MockKeyProbe {
    fn is_key_down(&self, key: Key) -> bool {
        self.down.lock().contains(&key)
    }

    fn modifiers(&self) -> ModifierSet {
        *self.modifiers.lock()
    }
}

/// Monitor that counts installs and removals.
#[derive(Debug, Default)]
pub struct MockMonitor {
    /// Install calls.
    installs: Mutex<Vec<MonitorSpec>>,
    /// Currently installed.
    active: Mutex<bool>,
}

impl MockMonitor {
    /// Nothing installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of install calls.
    pub fn install_count(&self) -> usize {
        self.installs.lock().len()
    }

    /// Spec of the latest install.
    pub fn last_spec(&self) -> Option<MonitorSpec> {
        self.installs.lock().last().copied()
    }

    /// True while monitors are installed.
    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }
}

impl EventMonitor for MockMonitor {
    fn install(&self, spec: MonitorSpec) {
        self.installs.lock().push(spec);
        *self.active.lock() = true;
    }

    fn remove_all(&self) {
        *self.active.lock() = false;
    }
}

/// A timer waiting to fire.
#[derive(Debug, Clone, Copy)]
struct Scheduled {
    /// Token delivered on firing.
    token: TimerToken,
    /// Next firing time.
    due: Instant,
    /// Re-arm period.
    period: Option<Duration>,
}

/// Timer driver keeping a schedule against a [`ManualClock`].
#[derive(Debug, Clone)]
pub struct ManualTimers {
    /// Time source for due times.
    clock: ManualClock,
    /// Pending firings, shared with the harness.
    queue: Arc<Mutex<Vec<Scheduled>>>,
}

impl ManualTimers {
    /// Driver scheduling against `clock`.
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            queue: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Kinds currently scheduled.
    pub fn scheduled(&self) -> Vec<TimerKind> {
        self.queue.lock().iter().map(|s| s.token.kind).collect()
    }

    /// Pop the earliest firing due at or before `deadline`, re-arming
    /// periodic timers.
    fn pop_due(&self, deadline: Instant) -> Option<(Instant, TimerToken)> {
        let mut queue = self.queue.lock();
        let idx = queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= deadline)
            .min_by_key(|(_, s)| s.due)
            .map(|(i, _)| i)?;
        let s = queue[idx];
        match s.period {
            Some(p) => queue[idx].due = s.due + p,
            None => {
                queue.remove(idx);
            }
        }
        Some((s.due, s.token))
    }
}

impl TimerDriver for ManualTimers {
    fn arm(&mut self, token: TimerToken, delay: Duration, period: Option<Duration>) {
        let due = self.clock.now() + delay;
        let mut queue = self.queue.lock();
        queue.retain(|s| s.token.kind != token.kind);
        queue.push(Scheduled { token, due, period });
    }

    fn cancel(&mut self, kind: TimerKind) {
        self.queue.lock().retain(|s| s.token.kind != kind);
    }
}

/// A controller wired to mocks, driven synchronously on a manual clock.
pub struct Harness {
    /// The controller under test.
    pub controller: Controller,
    /// Shared manual clock.
    pub clock: ManualClock,
    /// Candidate supply.
    pub supply: Arc<MockSupply>,
    /// Workspace.
    pub workspace: Arc<MockWorkspace>,
    /// Renderer.
    pub renderer: Arc<RecordingRenderer>,
    /// Key probe.
    pub keys: Arc<MockKeyProbe>,
    /// Event monitor.
    pub monitor: Arc<MockMonitor>,
    /// Timer schedule.
    pub timers: ManualTimers,
}

impl Harness {
    /// Harness with default timing over `supply`.
    pub fn new(supply: MockSupply) -> Self {
        Self::with_timing(supply, TimingConfig::default())
    }

    /// Harness with explicit timing.
    pub fn with_timing(supply: MockSupply, timing: TimingConfig) -> Self {
        let clock = ManualClock::new();
        let timers = ManualTimers::new(clock.clone());
        let supply = Arc::new(supply);
        let workspace = Arc::new(MockWorkspace::new());
        let renderer = Arc::new(RecordingRenderer::new());
        let keys = Arc::new(MockKeyProbe::new());
        let monitor = Arc::new(MockMonitor::new());
        let services = Services {
            supply: supply.clone(),
            workspace: workspace.clone(),
            renderer: renderer.clone(),
            keys: keys.clone(),
            monitor: monitor.clone(),
        };
        let controller = Controller::new(
            services,
            timing,
            Arc::new(clock.clone()),
            Box::new(timers.clone()),
        );
        Self {
            controller,
            clock,
            supply,
            workspace,
            renderer,
            keys,
            monitor,
            timers,
        }
    }

    /// Fire the group's shortcut.
    pub fn trigger(&mut self, group: &str) -> Result<()> {
        self.controller
            .handle(Command::Trigger(TriggerRequest::new(GroupId::from(group))))
    }

    /// Deliver an input event.
    pub fn input(&mut self, ev: InputEvent) {
        self.controller.handle_input(ev);
    }

    /// Press the trigger key and report it held.
    pub fn press(&mut self, key: Key) {
        self.keys.set_down(key, true);
        self.input(InputEvent::KeyDown { key, repeat: false });
    }

    /// Release a key.
    pub fn release(&mut self, key: Key) {
        self.keys.set_down(key, false);
        self.input(InputEvent::KeyUp { key });
    }

    /// Report the held modifiers.
    pub fn modifiers(&mut self, mods: ModifierSet) {
        self.keys.set_modifiers(mods);
        self.input(InputEvent::ModifiersChanged(mods));
    }

    /// Advance time by `ms`, firing due timers in order.
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.clock.now() + Duration::from_millis(ms);
        while let Some((due, token)) = self.timers.pop_due(deadline) {
            let now = self.clock.now();
            if due > now {
                self.clock.advance(due - now);
            }
            self.controller.on_timer(token);
        }
        let now = self.clock.now();
        if deadline > now {
            self.clock.advance(deadline - now);
        }
    }

    /// True when no timer is scheduled.
    pub fn timers_idle(&self) -> bool {
        self.timers.scheduled().is_empty()
    }
}
