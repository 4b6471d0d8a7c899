//! Replay a script against a live controller task.

use std::{sync::Arc, time::Duration};

use cycle_config::Config;
use cycle_core::GroupId;
use cycle_engine::{ControllerHandle, InputEvent, Services, TokioClock, spawn_controller};
use tokio::{task, time};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    script::{Script, Step},
    world::{SimWorld, Transcript},
};

/// Run `script` to completion and return what the controller did.
///
/// After the last step the controller gets `settle` to finish pending timers
/// before it is shut down.
pub async fn run(config: &Config, script: Script, settle: Duration) -> Result<Transcript> {
    let world = Arc::new(SimWorld::new(config, script.running, script.frontmost));
    let services = Services {
        supply: world.clone(),
        workspace: world.clone(),
        renderer: world.clone(),
        keys: world.clone(),
        monitor: world.clone(),
    };
    let (handle, join) = spawn_controller(services, config.timing(), Arc::new(TokioClock));

    for (n, step) in script.steps.into_iter().enumerate() {
        debug!(n, ?step, "step");
        apply(config, &world, &handle, step).await?;
        task::yield_now().await;
    }

    time::sleep(settle).await;
    handle.shutdown()?;
    join.await
        .map_err(|e| Error::Other(format!("controller task failed: {}", e)))?;
    if world.is_monitoring() {
        return Err(Error::Other("monitors left installed after shutdown".into()));
    }
    let transcript = world.transcript();
    info!(entries = transcript.len(), "sim_done");
    Ok(transcript)
}

/// Apply one step to the world and forward the matching event.
async fn apply(
    config: &Config,
    world: &SimWorld,
    handle: &ControllerHandle,
    step: Step,
) -> Result<()> {
    match step {
        Step::Trigger(group) => handle.trigger(GroupId::from(group))?,
        Step::TriggerNow(group) => handle.trigger_now(GroupId::from(group))?,
        Step::Shortcut(chord) => {
            let group = config
                .group_for_shortcut(chord)
                .ok_or_else(|| Error::Other(format!("no group bound to {}", chord)))?;
            handle.trigger(group.id.clone())?;
        }
        Step::KeyDown(key) => {
            world.set_key(key, true);
            handle.input(InputEvent::KeyDown { key, repeat: false })?;
        }
        Step::KeyRepeat(key) => handle.input(InputEvent::KeyDown { key, repeat: true })?,
        Step::KeyUp(key) => {
            world.set_key(key, false);
            handle.input(InputEvent::KeyUp { key })?;
        }
        Step::Modifiers(mods) => {
            world.set_modifiers(mods);
            handle.input(InputEvent::ModifiersChanged(mods))?;
        }
        Step::Click(id) => handle.user_select(id)?,
        Step::Focus(id) => world.set_frontmost(&id),
        Step::FocusLost => handle.input(InputEvent::FocusLost)?,
        Step::Quit(pid) => world.quit(pid),
        Step::Launch(app) => world.launch(app),
        Step::Wait(ms) => time::sleep(Duration::from_millis(ms)).await,
        Step::Dismiss => handle.dismiss()?,
        Step::Cancel => handle.cancel()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Entry;

    const CONFIG: &str = r#"(
        groups: [(
            id: "browsers",
            shortcut: "opt+tab",
            apps: [
                (bundle_id: "com.apple.Safari", name: "Safari"),
                (bundle_id: "org.mozilla.firefox", name: "Firefox"),
            ],
        )],
    )"#;

    const RUNNING: &str = r#"
        running: [
            (bundle_id: "com.apple.Safari", pid: 100, name: "Safari"),
            (bundle_id: "org.mozilla.firefox", pid: 200, name: "Firefox"),
        ],
        frontmost: "com.apple.Safari::100",
    "#;

    fn script(steps: &str) -> Script {
        Script::from_ron_str(&format!("({RUNNING} steps: [{steps}])")).expect("script")
    }

    #[tokio::test(start_paused = true)]
    async fn quick_tap_switches_without_overlay() {
        let cfg = cycle_config::from_ron_str(CONFIG).expect("config");
        let steps = r#"Modifiers("opt"), KeyDown("tab"), Trigger("browsers"), Wait(50),
            Modifiers(""), KeyUp("tab")"#;
        let out = run(&cfg, script(steps), Duration::from_secs(1))
            .await
            .expect("run");
        assert_eq!(
            out,
            vec![Entry::Activate {
                at: Duration::from_millis(50),
                id: "org.mozilla.firefox::200".into(),
                launched: false,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn held_modifiers_show_overlay_after_delay() {
        let cfg = cycle_config::from_ron_str(CONFIG).expect("config");
        let steps = r#"Modifiers("opt"), KeyDown("tab"), Trigger("browsers"), KeyUp("tab"),
            Wait(100), Modifiers("")"#;
        let out = run(&cfg, script(steps), Duration::from_secs(1))
            .await
            .expect("run");
        // Releasing the key with the modifier held peeks at once.
        assert!(matches!(
            out.first(),
            Some(Entry::Present { at, labels, selected: Some(1) })
                if at.is_zero() && labels == &["Safari", "Firefox"]
        ));
        assert!(matches!(out.last(), Some(Entry::Hide { .. })));
        assert!(out.iter().any(|e| matches!(
            e,
            Entry::Activate { id, .. } if id == "org.mozilla.firefox::200"
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn chord_dispatches_to_bound_group() {
        let cfg = cycle_config::from_ron_str(CONFIG).expect("config");
        let steps = r#"Modifiers("opt"), KeyDown("tab"), Shortcut("opt+tab"), Wait(50),
            Modifiers(""), KeyUp("tab")"#;
        let out = run(&cfg, script(steps), Duration::from_secs(1))
            .await
            .expect("run");
        assert!(matches!(
            out.as_slice(),
            [Entry::Activate { id, .. }] if id == "org.mozilla.firefox::200"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unbound_chord_fails_the_run() {
        let cfg = cycle_config::from_ron_str(CONFIG).expect("config");
        let err = run(&cfg, script(r#"Shortcut("cmd+f1")"#), Duration::from_secs(1))
            .await
            .expect_err("unbound");
        assert!(err.to_string().starts_with("no group bound to"), "{err}");
    }
}
