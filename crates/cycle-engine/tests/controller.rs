use cycle_core::{AppDescriptor, CandidateId, Group, GroupId, RunningApp};
use cycle_engine::{
    CandidateSupply, Error, InputEvent, Phase, TimerKind,
    test_support::{Harness, MockSupply},
};
use cycle_keys::{Chord, Key, Modifier, ModifierSet};
use tracing_subscriber::EnvFilter;

/// Route controller logs to the test writer; `RUST_LOG=debug` shows decisions.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A running process with no windows.
fn running(bundle: &str, pid: i32, name: &str) -> RunningApp {
    RunningApp {
        bundle_id: bundle.into(),
        pid,
        name: name.into(),
        windows: vec![],
    }
}

/// Three-app group bound to `shortcut`.
fn group(id: &str, shortcut: &str, launch: bool) -> Group {
    let mut g = Group::new(
        GroupId::from(id),
        "Browsers",
        vec![
            AppDescriptor::new("com.a", "Alpha"),
            AppDescriptor::new("com.b", "Beta"),
            AppDescriptor::new("com.c", "Gamma"),
        ],
        launch,
    );
    g.shortcut = Chord::parse(shortcut);
    g
}

/// Harness with all three apps running and Alpha frontmost.
fn harness(shortcut: &str) -> Harness {
    init_tracing();
    let supply = MockSupply::new();
    supply.add_group(group("browsers", shortcut, false));
    supply.set_running(vec![
        running("com.a", 100, "Alpha"),
        running("com.b", 200, "Beta"),
        running("com.c", 300, "Gamma"),
    ]);
    let h = Harness::new(supply);
    h.workspace.set_frontmost(Some("com.a::100"));
    h
}

fn opt() -> ModifierSet {
    Modifier::Option.into()
}

fn some(id: &str) -> Option<String> {
    Some(id.to_string())
}

/// After an interaction ends nothing may be left running.
fn assert_torn_down(h: &Harness) {
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(!h.monitor.is_active());
    assert!(h.timers_idle());
    for kind in TimerKind::ALL {
        assert!(!h.controller.timer_armed(kind));
    }
}

#[test]
fn quick_tap_without_modifiers_switches_silently() {
    let mut h = harness("f5");
    h.trigger("browsers").expect("trigger");
    assert_eq!(h.controller.phase(), Phase::PendingShow);
    h.release(Key::F5);
    assert_eq!(h.renderer.present_count(), 0);
    assert_eq!(h.workspace.activated(), vec!["com.b::200"]);
    assert_torn_down(&h);
}

#[test]
fn modifier_release_before_delay_switches_silently() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.advance(50);
    h.modifiers(ModifierSet::EMPTY);
    assert_eq!(h.renderer.present_count(), 0);
    assert_eq!(h.workspace.activated(), vec!["com.b::200"]);
    let g = h.supply.group(&GroupId::from("browsers")).expect("group");
    assert_eq!(g.last_active_id.as_deref(), Some("com.b::200"));
    assert_eq!(g.mru, vec!["com.b::200"]);
    assert_torn_down(&h);
}

#[test]
fn overlay_appears_after_show_delay() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.advance(199);
    assert_eq!(h.renderer.present_count(), 0);
    h.advance(1);
    assert_eq!(h.renderer.selections(), vec![some("com.b::200")]);
    assert_eq!(h.controller.phase(), Phase::Visible);
    assert_eq!(
        h.renderer.last_labels(),
        vec!["Alpha".to_string(), "Beta".into(), "Gamma".into()]
    );

    h.modifiers(ModifierSet::EMPTY);
    assert_eq!(h.workspace.activated(), vec!["com.b::200"]);
    assert_eq!(h.renderer.hide_count(), 1);
    assert_torn_down(&h);
}

#[test]
fn held_key_loops_at_interval_and_stops_after_release() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.keys.set_down(Key::Tab, true);
    h.trigger("browsers").expect("trigger");
    h.advance(200);
    assert_eq!(h.controller.phase(), Phase::Looping);
    assert_eq!(h.renderer.present_count(), 1);

    // Ticks at 400, 600 and 800.
    h.advance(600);
    assert_eq!(
        h.renderer.selections(),
        vec![
            some("com.b::200"),
            some("com.c::300"),
            some("com.a::100"),
            some("com.b::200"),
        ]
    );
    assert!(h.workspace.activated().is_empty());

    // Released with no key-up delivered: the next tick notices.
    h.keys.set_down(Key::Tab, false);
    h.advance(200);
    assert_eq!(h.renderer.present_count(), 4);
    assert_eq!(h.controller.phase(), Phase::Visible);
    assert!(!h.controller.timer_armed(TimerKind::LoopRepeat));

    h.modifiers(ModifierSet::EMPTY);
    assert_eq!(h.workspace.activated(), vec!["com.b::200"]);
    assert_torn_down(&h);
}

#[test]
fn key_repeat_heartbeats_keep_loop_alive() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    for _ in 0..6 {
        h.advance(100);
        h.input(InputEvent::KeyDown {
            key: Key::Tab,
            repeat: true,
        });
    }
    // Shown at 200, advanced at 400 and 600.
    assert_eq!(h.renderer.present_count(), 3);
    assert_eq!(h.controller.selection().map(CandidateId::as_str), Some("com.a::100"));

    h.advance(400);
    assert_eq!(h.renderer.present_count(), 3);
    assert_eq!(h.controller.phase(), Phase::Visible);
}

#[test]
fn repeated_trigger_while_looping_only_refreshes_heartbeat() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.keys.set_down(Key::Tab, true);
    h.trigger("browsers").expect("trigger");
    h.advance(300);
    assert_eq!(h.renderer.present_count(), 1);
    h.trigger("browsers").expect("repeat");
    assert_eq!(h.renderer.present_count(), 1);
    h.advance(100);
    assert_eq!(h.renderer.selections().last(), Some(&some("com.c::300")));
}

#[test]
fn peek_shows_immediately_and_never_loops() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.advance(50);
    h.release(Key::Tab);
    assert_eq!(h.renderer.selections(), vec![some("com.b::200")]);
    assert_eq!(h.controller.phase(), Phase::Visible);

    // Even a held key does not start the loop after a peek.
    h.keys.set_down(Key::Tab, true);
    h.advance(1000);
    assert_eq!(h.renderer.present_count(), 1);
    assert!(!h.controller.timer_armed(TimerKind::LoopRepeat));
}

#[test]
fn second_tap_while_visible_advances() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.release(Key::Tab);
    h.advance(150);
    h.trigger("browsers").expect("second");
    h.release(Key::Tab);
    assert_eq!(
        h.renderer.selections(),
        vec![some("com.b::200"), some("com.c::300")]
    );
    assert_eq!(h.controller.pending().map(CandidateId::as_str), Some("com.c::300"));

    h.modifiers(ModifierSet::EMPTY);
    assert_eq!(h.workspace.activated(), vec!["com.c::300"]);
    assert_torn_down(&h);
}

#[test]
fn arrows_navigate_and_update_mru() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.release(Key::Tab);

    h.press(Key::RightArrow);
    assert_eq!(h.controller.selection().map(CandidateId::as_str), Some("com.c::300"));
    h.press(Key::RightArrow);
    assert_eq!(h.controller.selection().map(CandidateId::as_str), Some("com.a::100"));
    h.press(Key::LeftArrow);
    assert_eq!(h.controller.selection().map(CandidateId::as_str), Some("com.c::300"));

    let g = h.supply.group(&GroupId::from("browsers")).expect("group");
    assert_eq!(g.mru, vec!["com.c::300", "com.a::100"]);

    h.press(Key::Return);
    assert_eq!(h.workspace.activated(), vec!["com.c::300"]);
    assert_torn_down(&h);
}

#[test]
fn escape_cancels_without_activation() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.advance(250);
    h.press(Key::Escape);
    assert!(h.workspace.activated().is_empty());
    assert_eq!(h.renderer.hide_count(), 1);
    assert_torn_down(&h);
}

#[test]
fn click_selects_candidate() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.advance(200);

    h.controller.user_select(&CandidateId::process("com.z", 9));
    assert_eq!(h.controller.selection().map(CandidateId::as_str), Some("com.b::200"));

    h.controller.user_select(&CandidateId::process("com.c", 300));
    assert_eq!(h.controller.selection().map(CandidateId::as_str), Some("com.c::300"));
    h.modifiers(ModifierSet::EMPTY);
    assert_eq!(h.workspace.activated(), vec!["com.c::300"]);
}

#[test]
fn focus_loss_finalizes() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.advance(200);
    h.input(InputEvent::FocusLost);
    assert_eq!(h.workspace.activated(), vec!["com.b::200"]);
    assert_torn_down(&h);
}

#[test]
fn unmodified_shortcut_auto_hides() {
    let mut h = harness("f5");
    h.trigger("browsers").expect("trigger");
    h.advance(200);
    assert_eq!(h.controller.phase(), Phase::Visible);
    h.advance(799);
    assert!(h.workspace.activated().is_empty());
    h.advance(1);
    assert_eq!(h.workspace.activated(), vec!["com.b::200"]);
    assert_eq!(h.renderer.hide_count(), 1);
    assert_torn_down(&h);
}

#[test]
fn held_unmodified_shortcut_outlives_auto_hide() {
    let mut h = harness("f5");
    h.keys.set_down(Key::F5, true);
    h.trigger("browsers").expect("trigger");
    h.advance(200);
    assert_eq!(h.controller.phase(), Phase::Looping);
    assert!(!h.controller.timer_armed(TimerKind::AutoHide));

    // OS key repeat re-fires the shortcut well past the auto-hide timeout.
    for _ in 0..10 {
        h.advance(100);
        h.trigger("browsers").expect("repeat");
        h.input(InputEvent::KeyDown {
            key: Key::F5,
            repeat: true,
        });
    }
    assert_eq!(h.controller.phase(), Phase::Looping);
    assert!(h.workspace.activated().is_empty());
    assert_eq!(h.renderer.hide_count(), 0);

    let selected = h.controller.selection().map(CandidateId::to_string);
    h.release(Key::F5);
    assert_eq!(h.workspace.activated(), selected.into_iter().collect::<Vec<_>>());
    assert_eq!(h.renderer.hide_count(), 1);
    assert_torn_down(&h);
}

#[test]
fn auto_hide_resumes_when_unmodified_loop_stops() {
    let mut h = harness("f5");
    h.keys.set_down(Key::F5, true);
    h.trigger("browsers").expect("trigger");
    h.advance(200);
    assert_eq!(h.controller.phase(), Phase::Looping);

    // Key-up never arrives; the tick at 400 notices the release.
    h.keys.set_down(Key::F5, false);
    h.advance(200);
    assert_eq!(h.controller.phase(), Phase::Visible);
    assert!(h.controller.timer_armed(TimerKind::AutoHide));

    h.advance(999);
    assert!(h.workspace.activated().is_empty());
    h.advance(1);
    assert_eq!(h.workspace.activated(), vec!["com.b::200"]);
    assert_torn_down(&h);
}

#[test]
fn global_trigger_heartbeats_alone_keep_loop_alive() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.keys.set_down(Key::Tab, false);
    h.trigger("browsers").expect("trigger");

    // Only the shortcut keeps firing: no hardware state, no local key events.
    for _ in 0..10 {
        h.advance(100);
        h.trigger("browsers").expect("repeat");
    }
    // Shown at 100 by the repeated trigger, advanced at 300, 500, 700, 900.
    assert_eq!(h.controller.phase(), Phase::Looping);
    assert_eq!(h.renderer.present_count(), 5);

    // Last heartbeat at 1000 is still fresh for the tick at 1100.
    h.advance(100);
    assert_eq!(h.renderer.present_count(), 6);
    assert_eq!(h.controller.phase(), Phase::Looping);

    // Stale by the next tick: the loop stops without advancing.
    h.advance(200);
    assert_eq!(h.controller.phase(), Phase::Visible);
    assert!(!h.controller.timer_armed(TimerKind::LoopRepeat));
    assert_eq!(h.renderer.present_count(), 6);
    h.advance(1000);
    assert_eq!(h.renderer.present_count(), 6);

    let selected = h.controller.selection().map(CandidateId::to_string);
    h.modifiers(ModifierSet::EMPTY);
    assert_eq!(h.workspace.activated(), selected.into_iter().collect::<Vec<_>>());
    assert_torn_down(&h);
}

#[test]
fn consecutive_interactions_walk_the_group() {
    let mut h = harness("f5");
    for expected in ["com.b::200", "com.c::300", "com.a::100"] {
        h.trigger("browsers").expect("trigger");
        h.release(Key::F5);
        h.advance(1000);
        assert_eq!(h.workspace.activated().last().map(String::as_str), Some(expected));
    }
    assert_eq!(h.renderer.present_count(), 0);
}

#[test]
fn frontmost_outside_group_resumes_last_active() {
    let supply = MockSupply::new();
    let mut g = group("browsers", "f5", false);
    g.last_active_id = Some("com.c::300".into());
    supply.add_group(g);
    supply.set_running(vec![running("com.a", 100, "Alpha"), running("com.c", 300, "Gamma")]);
    let mut h = Harness::new(supply);
    h.workspace.set_frontmost(Some("com.other::1"));
    h.trigger("browsers").expect("trigger");
    assert_eq!(h.controller.pending().map(CandidateId::as_str), Some("com.c::300"));
    h.release(Key::F5);
    assert_eq!(h.workspace.activated(), vec!["com.c::300"]);
}

#[test]
fn pending_candidate_follows_a_restart() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.supply.quit(200);
    h.supply.launch(running("com.b", 201, "Beta"));
    h.modifiers(ModifierSet::EMPTY);
    assert_eq!(h.workspace.activated(), vec!["com.b::201"]);
}

#[test]
fn idle_app_is_launched_when_allowed() {
    let supply = MockSupply::new();
    supply.add_group(group("browsers", "f5", true));
    supply.set_running(vec![running("com.a", 100, "Alpha")]);
    let mut h = Harness::new(supply);
    h.workspace.set_frontmost(Some("com.a::100"));
    h.trigger("browsers").expect("trigger");
    h.release(Key::F5);
    assert_eq!(h.workspace.activations(), vec![("com.b".to_string(), true)]);
}

#[test]
fn failed_activation_is_not_remembered() {
    let mut h = harness("f5");
    h.workspace.fail_on("com.b::200");
    h.trigger("browsers").expect("trigger");
    h.release(Key::F5);
    assert!(h.workspace.activated().is_empty());
    let g = h.supply.group(&GroupId::from("browsers")).expect("group");
    assert_eq!(g.last_active_id, None);
    assert_torn_down(&h);
}

#[test]
fn per_window_candidates_cycle_windows() {
    let supply = MockSupply::per_window();
    supply.add_group(group("browsers", "f5", false));
    supply.set_running(vec![RunningApp {
        bundle_id: "com.a".into(),
        pid: 100,
        name: "Alpha".into(),
        windows: vec!["Inbox".into(), "Drafts".into()],
    }]);
    let mut h = Harness::new(supply);
    h.workspace.set_frontmost(Some("com.a::100::w0"));
    h.trigger("browsers").expect("trigger");
    h.release(Key::F5);
    assert_eq!(h.workspace.activated(), vec!["com.a::100::w1"]);
}

#[test]
fn empty_group_does_nothing() {
    let supply = MockSupply::new();
    supply.add_group(group("browsers", "opt+tab", false));
    let mut h = Harness::new(supply);
    h.trigger("browsers").expect("trigger");
    assert_eq!(h.monitor.install_count(), 0);
    assert_eq!(h.renderer.present_count(), 0);
    assert_torn_down(&h);
}

#[test]
fn unknown_group_is_an_error() {
    let mut h = harness("opt+tab");
    let err = h.trigger("nope").expect_err("unknown");
    assert!(matches!(err, Error::UnknownGroup(ref g) if g == "nope"));
    assert_eq!(h.controller.phase(), Phase::Idle);
}

#[test]
fn trigger_for_another_group_supersedes() {
    let mut h = harness("opt+tab");
    h.supply.add_group(group("editors", "opt+grave", false));
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("first");
    h.advance(200);
    h.trigger("editors").expect("second");
    assert!(h.workspace.activated().is_empty());
    assert_eq!(h.renderer.hide_count(), 1);
    assert_eq!(h.controller.active_group(), Some(&GroupId::from("editors")));
    assert!(h.monitor.is_active());
    assert_eq!(h.monitor.last_spec().and_then(|s| s.trigger_key), Some(Key::Grave));

    h.controller.cancel();
    assert_torn_down(&h);
}

#[test]
fn stale_timer_firings_are_ignored() {
    let mut h = harness("opt+tab");
    h.keys.set_modifiers(opt());
    h.trigger("browsers").expect("trigger");
    h.modifiers(ModifierSet::EMPTY);
    assert_eq!(h.workspace.activated().len(), 1);
    h.advance(5000);
    assert_eq!(h.renderer.present_count(), 0);
    assert_eq!(h.workspace.activated().len(), 1);
}
