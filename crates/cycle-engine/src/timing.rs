//! Timing knobs for the presentation controller.

use std::time::Duration;

/// Clamp bounds for the show delay.
pub const SHOW_DELAY_MIN_MS: u64 = 0;
/// Upper bound for the show delay.
pub const SHOW_DELAY_MAX_MS: u64 = 2000;
/// Lower bound for the loop interval.
pub const LOOP_INTERVAL_MIN_MS: u64 = 50;
/// Upper bound for the loop interval.
pub const LOOP_INTERVAL_MAX_MS: u64 = 2000;
/// Lower bound for the auto-hide timeout.
pub const AUTO_HIDE_MIN_MS: u64 = 100;
/// Upper bound for the auto-hide timeout.
pub const AUTO_HIDE_MAX_MS: u64 = 10_000;
/// Upper bound for the repeat and heartbeat windows.
pub const WINDOW_MAX_MS: u64 = 2000;

/// Default delay between a trigger and the overlay appearing.
const DEFAULT_SHOW_DELAY_MS: u64 = 200;
/// Default window inside which a second trigger counts as a repeat.
const DEFAULT_REPEAT_WINDOW_MS: u64 = 500;
/// Default period of the hold-to-loop auto advance.
const DEFAULT_LOOP_INTERVAL_MS: u64 = 200;
/// Default freshness window for key heartbeats.
const DEFAULT_HEARTBEAT_WINDOW_MS: u64 = 150;
/// Default overlay lifetime for shortcuts without modifiers.
const DEFAULT_AUTO_HIDE_MS: u64 = 1000;

/// Timings used by the controller. Construct with [`TimingConfig::from_millis`]
/// to apply clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Hold time before the overlay is shown.
    pub show_delay: Duration,
    /// Two triggers closer than this are treated as a repeat.
    pub repeat_window: Duration,
    /// Auto-advance period while the trigger key is held.
    pub loop_interval: Duration,
    /// A heartbeat younger than this counts as "key still held".
    pub heartbeat_window: Duration,
    /// Overlay lifetime after the last trigger when no modifiers are required.
    pub auto_hide: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::from_millis(
            DEFAULT_SHOW_DELAY_MS,
            DEFAULT_REPEAT_WINDOW_MS,
            DEFAULT_LOOP_INTERVAL_MS,
            DEFAULT_HEARTBEAT_WINDOW_MS,
            DEFAULT_AUTO_HIDE_MS,
        )
    }
}

impl TimingConfig {
    /// Build a config from millisecond values, clamping each into range.
    pub fn from_millis(
        show_delay_ms: u64,
        repeat_window_ms: u64,
        loop_interval_ms: u64,
        heartbeat_window_ms: u64,
        auto_hide_ms: u64,
    ) -> Self {
        Self {
            show_delay: Duration::from_millis(
                show_delay_ms.clamp(SHOW_DELAY_MIN_MS, SHOW_DELAY_MAX_MS),
            ),
            repeat_window: Duration::from_millis(repeat_window_ms.min(WINDOW_MAX_MS)),
            loop_interval: Duration::from_millis(
                loop_interval_ms.clamp(LOOP_INTERVAL_MIN_MS, LOOP_INTERVAL_MAX_MS),
            ),
            heartbeat_window: Duration::from_millis(heartbeat_window_ms.min(WINDOW_MAX_MS)),
            auto_hide: Duration::from_millis(auto_hide_ms.clamp(AUTO_HIDE_MIN_MS, AUTO_HIDE_MAX_MS)),
        }
    }
}
