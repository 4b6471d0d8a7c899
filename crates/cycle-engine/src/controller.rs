//! Presentation timing controller.
//!
//! Every shortcut press runs through [`Controller::schedule_show`], which
//! records the candidate that would be activated if the interaction ended
//! now and then either presents the overlay at once or arms the show delay.
//! Release of the shortcut's modifiers or trigger key, focus loss, or an
//! explicit dismiss ends the interaction and activates that candidate, so a
//! release before the overlay ever appears still switches.
//!
//! Releasing the trigger key before the delay fires is a *peek* when the
//! shortcut's modifiers are still held (show at once, never loop) and a
//! *quick tap* otherwise (switch silently). Holding the trigger key past the
//! delay enters the *loop*, auto-advancing the highlight every interval while
//! any of the hardware state, the global trigger heartbeat, or the local key
//! heartbeat says the key is down.
//!
//! The controller is a plain state machine. It never sleeps or spawns: timers
//! go through a [`TimerDriver`] and come back as [`Controller::on_timer`]
//! calls, and all input is delivered by whoever owns it (see
//! [`crate::spawn_controller`]).

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use cycle_core::{
    Candidate, CandidateId, CycleInputs, Direction, Group, GroupId, resolve, step_candidate,
    updated_mru,
};
use cycle_keys::{Key, ModifierSet};
use tracing::{debug, info, trace, warn};

use crate::{
    Error, Result,
    clock::Clock,
    deps::MonitorSpec,
    event::{Command, InputEvent, TriggerRequest},
    key_state::HoldTracker,
    services::Services,
    timers::{TimerDriver, TimerKind, TimerSet, TimerToken},
    timing::TimingConfig,
};

/// Externally visible phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No interaction in progress.
    Idle,
    /// Triggered; waiting for the show delay or a release.
    PendingShow,
    /// Overlay visible.
    Visible,
    /// Overlay visible and auto-advancing while the trigger key is held.
    Looping,
}

/// One interaction, from the first trigger to dismissal.
#[derive(Debug)]
struct Session {
    /// Group being cycled.
    group: GroupId,
    /// Label handed to the renderer.
    label: String,
    /// Modifiers whose release ends the interaction.
    required: ModifierSet,
    /// Non-modifier key tracked for release and hold.
    trigger_key: Option<Key>,
    /// Candidate activated if the interaction ends now.
    pending: Option<CandidateId>,
    /// Candidate highlighted in the overlay.
    selection: Option<CandidateId>,
    /// Overlay presented.
    visible: bool,
    /// Loop timer running.
    looping: bool,
    /// Revealed by a peek; the loop stays off.
    peeked: bool,
    /// Event monitors installed.
    monitoring: bool,
}

impl Session {
    /// Start a session for `group`.
    fn new(group: &Group, required: ModifierSet, trigger_key: Option<Key>) -> Self {
        let label = group
            .shortcut
            .map(|c| c.to_string())
            .unwrap_or_else(|| group.name.clone());
        Self {
            group: group.id.clone(),
            label,
            required,
            trigger_key,
            pending: None,
            selection: None,
            visible: false,
            looping: false,
            peeked: false,
            monitoring: false,
        }
    }
}

/// The stateful orchestrator deciding when to show, loop, and activate.
pub struct Controller {
    /// Collaborators.
    services: Services,
    /// Time source for the repeat and heartbeat windows.
    clock: Arc<dyn Clock>,
    /// Delays and windows.
    timing: TimingConfig,
    /// Generation bookkeeping for the three timers.
    timers: TimerSet,
    /// Schedules timer firings.
    driver: Box<dyn TimerDriver>,
    /// Active interaction, if any.
    session: Option<Session>,
    /// Time of the previous trigger, cleared on every dismiss.
    last_trigger: Option<Instant>,
    /// Heartbeats and last reported modifiers.
    hold: HoldTracker,
}

impl Controller {
    /// Create an idle controller.
    pub fn new(
        services: Services,
        timing: TimingConfig,
        clock: Arc<dyn Clock>,
        driver: Box<dyn TimerDriver>,
    ) -> Self {
        Self {
            services,
            clock,
            timing,
            timers: TimerSet::new(),
            driver,
            session: None,
            last_trigger: None,
            hold: HoldTracker::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        match &self.session {
            None => Phase::Idle,
            Some(s) if s.looping => Phase::Looping,
            Some(s) if s.visible => Phase::Visible,
            Some(_) => Phase::PendingShow,
        }
    }

    /// Candidate that would be activated now.
    pub fn pending(&self) -> Option<&CandidateId> {
        self.session.as_ref().and_then(|s| s.pending.as_ref())
    }

    /// Candidate highlighted in the overlay.
    pub fn selection(&self) -> Option<&CandidateId> {
        self.session.as_ref().and_then(|s| s.selection.as_ref())
    }

    /// Group of the active interaction.
    pub fn active_group(&self) -> Option<&GroupId> {
        self.session.as_ref().map(|s| &s.group)
    }

    /// True when `kind` has a live timer.
    pub fn timer_armed(&self, kind: TimerKind) -> bool {
        self.timers.is_armed(kind)
    }

    /// Apply one command. `Shutdown` tears the interaction down without
    /// activating.
    pub fn handle(&mut self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Trigger(req) => self.schedule_show(&req)?,
            Command::Input(ev) => self.handle_input(ev),
            Command::UserSelect(id) => self.user_select(&id),
            Command::Dismiss => self.dismiss(),
            Command::Cancel | Command::Shutdown => self.cancel(),
            Command::Timer(token) => self.on_timer(token),
        }
        Ok(())
    }

    /// Handle a shortcut trigger for a group.
    pub fn schedule_show(&mut self, req: &TriggerRequest) -> Result<()> {
        if self.session.as_ref().is_some_and(|s| s.group != req.group) {
            debug!(group = %req.group, "trigger_supersedes_session");
            self.end_session(false);
        }

        let now = self.clock.now();
        let repeated = self
            .last_trigger
            .is_some_and(|t| now.saturating_duration_since(t) < self.timing.repeat_window);
        self.last_trigger = Some(now);
        self.hold.note_global(now);

        if repeated && self.session.as_ref().is_some_and(|s| s.looping) {
            trace!(group = %req.group, "loop_heartbeat");
            return Ok(());
        }

        let supply = self.services.supply.clone();
        let group = supply
            .group(&req.group)
            .ok_or_else(|| Error::UnknownGroup(req.group.to_string()))?;
        let candidates = self.snapshot(&group);
        if candidates.is_empty() {
            debug!(group = %group.id, "no_candidates");
            if self.session.is_some() {
                self.end_session(false);
            }
            return Ok(());
        }

        let required = supply.required_modifiers(&group.id).unwrap_or_default();
        let trigger_key = supply.trigger_key(&group.id);
        let last_active = supply.last_active_id(&group.id);
        let frontmost = self.services.workspace.frontmost();

        let session = self
            .session
            .get_or_insert_with(|| Session::new(&group, required, trigger_key));
        let pending = step_candidate(
            &CycleInputs {
                candidates: &candidates,
                frontmost: frontmost.as_deref(),
                overlay_selection: session.selection.as_ref().map(CandidateId::as_str),
                last_active: last_active.as_deref(),
                overlay_visible: session.visible,
            },
            Direction::Forward,
        );
        let visible = session.visible;
        debug!(
            group = %group.id,
            pending = ?pending.as_ref().map(CandidateId::as_str),
            repeated,
            visible,
            immediate = req.immediate,
            "schedule_show"
        );
        session.pending = pending;

        if visible || repeated || req.immediate {
            self.cancel_timer(TimerKind::ShowDelay);
            self.present(&candidates);
            self.install_monitors();
            self.maybe_start_loop(now);
        } else {
            self.arm_timer(TimerKind::ShowDelay, self.timing.show_delay, None);
            self.install_monitors();
        }
        let looping = self.session.as_ref().is_some_and(|s| s.looping);
        if required.is_empty() && !looping {
            self.arm_timer(TimerKind::AutoHide, self.timing.auto_hide, None);
        }
        Ok(())
    }

    /// Handle keyboard or focus input observed by the installed monitors.
    pub fn handle_input(&mut self, ev: InputEvent) {
        let Some(s) = self.session.as_ref() else {
            trace!(?ev, "input_without_session");
            return;
        };
        if !s.monitoring {
            return;
        }
        let required = s.required;
        match ev {
            InputEvent::ModifiersChanged(mods) => {
                self.hold.note_modifiers(mods);
                if !required.is_empty() && !mods.contains_all(required) {
                    debug!(held = %mods, required = %required, "modifiers_released");
                    self.finalize();
                }
            }
            InputEvent::KeyDown { key, repeat } => self.on_key_down(key, repeat),
            InputEvent::KeyUp { key } => self.on_key_up(key),
            InputEvent::FocusLost => {
                debug!("focus_lost");
                self.finalize();
            }
        }
    }

    /// The overlay reported a click on `id`.
    pub fn user_select(&mut self, id: &CandidateId) {
        if !self.session.as_ref().is_some_and(|s| s.visible) {
            debug!(candidate = %id, "select_without_overlay");
            return;
        }
        let Some(candidates) = self.session_candidates() else {
            return;
        };
        if !candidates.iter().any(|c| c.id == *id) {
            debug!(candidate = %id, "select_unknown_candidate");
            return;
        }
        self.stop_loop();
        self.select_explicit(id, &candidates);
    }

    /// End the interaction, activating the pending candidate.
    pub fn dismiss(&mut self) {
        self.finalize();
    }

    /// End the interaction without activating anything.
    pub fn cancel(&mut self) {
        if self.session.is_some() {
            debug!("cancel");
        }
        self.end_session(false);
    }

    /// A timer fired.
    pub fn on_timer(&mut self, token: TimerToken) {
        if !self.timers.is_current(token) {
            trace!(kind = ?token.kind, generation = token.generation, "timer_stale");
            return;
        }
        match token.kind {
            TimerKind::ShowDelay => {
                self.timers.clear(TimerKind::ShowDelay);
                self.fire_show();
            }
            TimerKind::LoopRepeat => self.loop_tick(),
            TimerKind::AutoHide => {
                self.timers.clear(TimerKind::AutoHide);
                debug!("auto_hide");
                self.finalize();
            }
        }
    }

    /// Live candidates for `group`, in the group's cycling order.
    fn snapshot(&self, group: &Group) -> Vec<Candidate> {
        group.arrange(self.services.supply.live_candidates(group))
    }

    /// Fresh candidates for the active session; `None` when the group or
    /// every candidate is gone.
    fn session_candidates(&self) -> Option<Vec<Candidate>> {
        let s = self.session.as_ref()?;
        let group = self.services.supply.group(&s.group)?;
        let candidates = self.snapshot(&group);
        (!candidates.is_empty()).then_some(candidates)
    }

    /// Modifiers currently held, preferring the latest event over polling.
    fn current_modifiers(&self) -> ModifierSet {
        self.hold
            .modifiers()
            .unwrap_or_else(|| self.services.keys.modifiers())
    }

    /// Triple check that the tracked key is still down.
    fn key_held(&self, key: Key, now: Instant) -> bool {
        self.services.keys.is_key_down(key) || self.hold.recent(now, self.timing.heartbeat_window)
    }

    /// Show the overlay with the pending candidate highlighted.
    fn present(&mut self, candidates: &[Candidate]) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        s.selection = s.pending.clone();
        s.visible = true;
        trace!(selected = ?s.selection.as_ref().map(CandidateId::as_str), "present");
        self.services
            .renderer
            .present(candidates, s.selection.as_ref(), &s.label);
    }

    /// Install (or reinstall) the release monitors.
    fn install_monitors(&mut self) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        if s.monitoring {
            self.services.monitor.remove_all();
        }
        self.services.monitor.install(MonitorSpec {
            required: s.required,
            trigger_key: s.trigger_key,
        });
        s.monitoring = true;
    }

    /// Enter the loop when the overlay is up and the trigger key is held.
    fn maybe_start_loop(&mut self, now: Instant) {
        let Some(s) = self.session.as_ref() else {
            return;
        };
        if s.looping || s.peeked || !s.visible {
            return;
        }
        let Some(key) = s.trigger_key else {
            return;
        };
        if !self.key_held(key, now) {
            trace!(key = %key.to_spec(), "loop_not_held");
            return;
        }
        let interval = self.timing.loop_interval;
        // The hold keeps the overlay up; auto-hide resumes when the loop stops.
        self.cancel_timer(TimerKind::AutoHide);
        self.arm_timer(TimerKind::LoopRepeat, interval, Some(interval));
        if let Some(s) = self.session.as_mut() {
            s.looping = true;
        }
        debug!(key = %key.to_spec(), interval_ms = interval.as_millis(), "loop_start");
    }

    /// Stop auto-advancing, leaving the overlay as is.
    fn stop_loop(&mut self) {
        self.cancel_timer(TimerKind::LoopRepeat);
        let Some(s) = self.session.as_mut() else {
            return;
        };
        if !s.looping {
            return;
        }
        s.looping = false;
        let unmodified = s.required.is_empty();
        debug!("loop_stop");
        if unmodified {
            self.arm_timer(TimerKind::AutoHide, self.timing.auto_hide, None);
        }
    }

    /// The show delay elapsed.
    fn fire_show(&mut self) {
        if !self.session.as_ref().is_some_and(|s| !s.visible) {
            return;
        }
        let Some(candidates) = self.session_candidates() else {
            debug!("show_without_candidates");
            self.end_session(false);
            return;
        };
        self.present(&candidates);
        let now = self.clock.now();
        self.maybe_start_loop(now);
    }

    /// One loop period elapsed.
    fn loop_tick(&mut self) {
        let now = self.clock.now();
        let key = match self.session.as_ref() {
            Some(s) if s.looping => s.trigger_key,
            _ => None,
        };
        let Some(key) = key else {
            self.stop_loop();
            return;
        };
        if !self.key_held(key, now) {
            debug!(key = %key.to_spec(), "loop_released");
            self.stop_loop();
            return;
        }
        let Some(candidates) = self.session_candidates() else {
            return;
        };
        let frontmost = self.services.workspace.frontmost();
        let Some(s) = self.session.as_mut() else {
            return;
        };
        let next = step_candidate(
            &CycleInputs {
                candidates: &candidates,
                frontmost: frontmost.as_deref(),
                overlay_selection: s.selection.as_ref().map(CandidateId::as_str),
                last_active: None,
                overlay_visible: true,
            },
            Direction::Forward,
        );
        trace!(next = ?next.as_ref().map(CandidateId::as_str), "loop_advance");
        s.pending = next.clone();
        s.selection = next;
        self.services
            .renderer
            .present(&candidates, s.selection.as_ref(), &s.label);
    }

    /// Handle a key press while monitoring.
    fn on_key_down(&mut self, key: Key, repeat: bool) {
        let Some(s) = self.session.as_ref() else {
            return;
        };
        if s.trigger_key == Some(key) {
            let now = self.clock.now();
            self.hold.note_local(now);
            trace!(repeat, "key_heartbeat");
            return;
        }
        if key == Key::Escape {
            self.cancel();
            return;
        }
        if !s.visible {
            return;
        }
        match key {
            Key::RightArrow | Key::DownArrow | Key::Tab => self.navigate(Direction::Forward),
            Key::LeftArrow | Key::UpArrow => self.navigate(Direction::Backward),
            Key::Return => self.finalize(),
            _ => {}
        }
    }

    /// Handle a key release while monitoring.
    fn on_key_up(&mut self, key: Key) {
        let Some(s) = self.session.as_ref() else {
            return;
        };
        if s.trigger_key != Some(key) {
            return;
        }
        let required = s.required;
        if s.visible {
            self.stop_loop();
            if required.is_empty() {
                self.finalize();
            }
            return;
        }

        // Released before the overlay appeared.
        let held = self.current_modifiers();
        if !required.is_empty() && held.contains_all(required) {
            debug!(held = %held, "peek");
            if let Some(s) = self.session.as_mut() {
                s.peeked = true;
            }
            self.cancel_timer(TimerKind::ShowDelay);
            self.fire_show();
        } else {
            debug!("quick_tap");
            self.finalize();
        }
    }

    /// Arrow-key navigation.
    fn navigate(&mut self, dir: Direction) {
        self.stop_loop();
        let Some(candidates) = self.session_candidates() else {
            return;
        };
        let selection = self.selection().map(|id| id.as_str().to_string());
        let next = step_candidate(
            &CycleInputs {
                candidates: &candidates,
                frontmost: None,
                overlay_selection: selection.as_deref(),
                last_active: None,
                overlay_visible: true,
            },
            dir,
        );
        if let Some(id) = next {
            self.select_explicit(&id, &candidates);
        }
    }

    /// Highlight `id` as the user's explicit choice and record it in the MRU
    /// ahead of the final release.
    fn select_explicit(&mut self, id: &CandidateId, candidates: &[Candidate]) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        s.selection = Some(id.clone());
        s.pending = Some(id.clone());
        debug!(candidate = %id, "select_explicit");
        self.services
            .renderer
            .present(candidates, s.selection.as_ref(), &s.label);
        let group = s.group.clone();
        self.record_mru(&group, id, candidates);
    }

    /// Move `id` to the front of the group's MRU order.
    fn record_mru(&self, group_id: &GroupId, id: &CandidateId, candidates: &[Candidate]) {
        let supply = &self.services.supply;
        let Some(group) = supply.group(group_id) else {
            return;
        };
        let live: HashSet<String> = candidates.iter().map(|c| c.id.to_string()).collect();
        let mru = updated_mru(
            &supply.mru_order(group_id),
            id.as_str(),
            &group.stable_ids(),
            &live,
        );
        supply.set_mru_order(group_id, mru);
    }

    /// End the interaction and activate the pending candidate.
    fn finalize(&mut self) {
        self.end_session(true);
    }

    /// Tear down the interaction: all timers, the overlay, and the monitors.
    fn end_session(&mut self, activate: bool) {
        for kind in TimerKind::ALL {
            self.cancel_timer(kind);
        }
        self.last_trigger = None;
        self.hold.clear();
        let Some(s) = self.session.take() else {
            return;
        };
        if activate && let Some(id) = &s.pending {
            self.activate(&s.group, id);
        }
        if s.visible {
            self.services.renderer.hide();
        }
        self.services.monitor.remove_all();
        debug!(group = %s.group, activate, "session_end");
    }

    /// Bring `id` forward and persist it as the group's last active.
    fn activate(&self, group_id: &GroupId, id: &CandidateId) {
        let supply = &self.services.supply;
        let Some(group) = supply.group(group_id) else {
            warn!(group = %group_id, "activate_unknown_group");
            return;
        };
        let candidates = self.snapshot(&group);
        let target = candidates
            .iter()
            .find(|c| c.id == *id)
            .or_else(|| resolve(Some(id.as_str()), &candidates));
        let Some(target) = target else {
            debug!(candidate = %id, "pending_candidate_gone");
            return;
        };
        if !target.running && !group.launch_if_needed {
            debug!(candidate = %target.id, "not_running_and_no_launch");
            return;
        }
        info!(group = %group.id, candidate = %target.id, launch = !target.running, "activate");
        if let Err(e) = self
            .services
            .workspace
            .activate_or_launch(target, group.launch_if_needed)
        {
            warn!(candidate = %target.id, error = %e, "activation_failed");
            return;
        }
        supply.set_last_active_id(&group.id, target.id.as_str());
        self.record_mru(&group.id, &target.id, &candidates);
    }

    /// Arm a timer, superseding any previous instance of its kind.
    fn arm_timer(&mut self, kind: TimerKind, delay: Duration, period: Option<Duration>) {
        let token = self.timers.arm(kind);
        trace!(?kind, generation = token.generation, delay_ms = delay.as_millis(), "timer_arm");
        self.driver.arm(token, delay, period);
    }

    /// Cancel a timer. Idempotent.
    fn cancel_timer(&mut self, kind: TimerKind) {
        if self.timers.clear(kind) {
            trace!(?kind, "timer_cancel");
        }
        self.driver.cancel(kind);
    }
}
