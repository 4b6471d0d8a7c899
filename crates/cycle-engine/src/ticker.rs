//! Tokio-backed timer driver.
//!
//! Each armed timer is a task that sleeps for the initial delay and then,
//! for periodic timers, ticks on an interval. Firings are posted onto the
//! controller's command channel rather than run in place, so timer callbacks
//! never race the controller's other event handling.

use std::{collections::HashMap, time::Duration};

use tokio::{
    sync::mpsc::{UnboundedSender, WeakUnboundedSender},
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    event::Command,
    timers::{TimerDriver, TimerKind, TimerToken},
};

/// Timer driver that runs one tokio task per armed timer.
pub struct TokioTimers {
    /// Weak so armed timers do not keep the controller channel open.
    tx: WeakUnboundedSender<Command>,
    /// Cancellation handles of running timers, by kind.
    entries: HashMap<TimerKind, CancellationToken>,
}

impl TokioTimers {
    /// Create a driver posting firings to `tx`.
    pub fn new(tx: &UnboundedSender<Command>) -> Self {
        Self {
            tx: tx.downgrade(),
            entries: HashMap::new(),
        }
    }
}

/// Post `token` to the controller. Returns false once the channel is gone.
fn deliver(tx: &WeakUnboundedSender<Command>, token: TimerToken) -> bool {
    match tx.upgrade() {
        Some(tx) => tx.send(Command::Timer(token)).is_ok(),
        None => false,
    }
}

impl TimerDriver for TokioTimers {
    fn arm(&mut self, token: TimerToken, delay: Duration, period: Option<Duration>) {
        // Replace any existing timer of this kind
        self.cancel(token.kind);

        let cancel = CancellationToken::new();
        let cancelled = cancel.clone();
        let tx = self.tx.clone();

        let fut = async move {
            trace!(
                kind = ?token.kind,
                generation = token.generation,
                delay_ms = delay.as_millis(),
                period_ms = period.map(|p| p.as_millis()),
                "ticker_start"
            );

            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = cancelled.cancelled() => {
                    trace!(kind = ?token.kind, "ticker_cancelled_initial");
                    return;
                }
            }
            if !deliver(&tx, token) {
                return;
            }
            let Some(period) = period else {
                return;
            };

            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => {
                        trace!(kind = ?token.kind, "ticker_cancelled");
                        return;
                    }
                    _ = ticker.tick() => {
                        if !deliver(&tx, token) {
                            return;
                        }
                    }
                }
            }
        };

        tokio::spawn(fut);
        self.entries.insert(token.kind, cancel);
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(cancel) = self.entries.remove(&kind) {
            cancel.cancel();
            // Don't abort the handle, let it cancel gracefully via the token
            trace!(kind = ?kind, "ticker_stop");
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, cancel) in self.entries.drain() {
            cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn token(kind: TimerKind, generation: u64) -> TimerToken {
        TimerToken { kind, generation }
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TokioTimers::new(&tx);
        timers.arm(token(TimerKind::ShowDelay, 1), Duration::from_millis(200), None);
        time::sleep(Duration::from_millis(1000)).await;
        assert!(matches!(rx.try_recv(), Ok(Command::Timer(t)) if t.generation == 1));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_ticks_until_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TokioTimers::new(&tx);
        timers.arm(
            token(TimerKind::LoopRepeat, 7),
            Duration::from_millis(100),
            Some(Duration::from_millis(100)),
        );
        time::sleep(Duration::from_millis(350)).await;
        timers.cancel(TimerKind::LoopRepeat);
        time::sleep(Duration::from_millis(500)).await;
        let mut fired = 0;
        while rx.try_recv().is_ok() {
            fired += 1;
        }
        assert_eq!(fired, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_previous() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TokioTimers::new(&tx);
        timers.arm(token(TimerKind::AutoHide, 1), Duration::from_millis(100), None);
        timers.arm(token(TimerKind::AutoHide, 2), Duration::from_millis(300), None);
        time::sleep(Duration::from_millis(1000)).await;
        let mut seen = Vec::new();
        while let Ok(Command::Timer(t)) = rx.try_recv() {
            seen.push(t.generation);
        }
        assert_eq!(seen, vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_timers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TokioTimers::new(&tx);
        timers.arm(token(TimerKind::ShowDelay, 1), Duration::from_millis(100), None);
        drop(timers);
        time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
