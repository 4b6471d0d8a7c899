//! On-disk configuration layout, deserialized straight from RON.

use std::time::Duration;

use cycle_core::CycleOrder;
use cycle_engine::TimingConfig;
use serde::Deserialize;

// Helper: accept either a plain string or an Option<String>
fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
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

/// Whole milliseconds in `d`, saturating.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Timing knobs in milliseconds. Omitted fields keep the engine defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RawTiming {
    /// Delay before the overlay appears.
    pub show_delay_ms: u64,
    /// Window in which a second trigger counts as a repeat.
    pub repeat_window_ms: u64,
    /// Period of the auto-advance loop.
    pub loop_interval_ms: u64,
    /// How long a heartbeat keeps the trigger key counted as held.
    pub heartbeat_window_ms: u64,
    /// Timeout for shortcuts without modifiers.
    pub auto_hide_ms: u64,
}

impl Default for RawTiming {
    fn default() -> Self {
        Self::from_timing(TimingConfig::default())
    }
}

impl RawTiming {
    /// Millisecond view of `t`.
    pub fn from_timing(t: TimingConfig) -> Self {
        Self {
            show_delay_ms: millis(t.show_delay),
            repeat_window_ms: millis(t.repeat_window),
            loop_interval_ms: millis(t.loop_interval),
            heartbeat_window_ms: millis(t.heartbeat_window),
            auto_hide_ms: millis(t.auto_hide),
        }
    }

    /// Clamped engine timing.
    pub fn to_timing(self) -> TimingConfig {
        TimingConfig::from_millis(
            self.show_delay_ms,
            self.repeat_window_ms,
            self.loop_interval_ms,
            self.heartbeat_window_ms,
            self.auto_hide_ms,
        )
    }
}

/// One configured application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawApp {
    /// Stable application identifier.
    pub bundle_id: String,
    /// Display name; the bundle id when omitted.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub name: Option<String>,
}

/// One group definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawGroup {
    /// Unique group id.
    pub id: String,
    /// Display name; the id when omitted.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub name: Option<String>,
    /// Chord spec such as `"opt+tab"`.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub shortcut: Option<String>,
    /// Launch the selected app when it is not running.
    #[serde(default)]
    pub launch_if_needed: bool,
    /// Candidate ordering.
    #[serde(default)]
    pub order: CycleOrder,
    /// Member applications, in configured order.
    pub apps: Vec<RawApp>,
}

/// Top-level file layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Timing overrides.
    #[serde(default)]
    pub timing: RawTiming,
    /// One candidate per window instead of per process.
    #[serde(default)]
    pub per_window: bool,
    /// Group definitions.
    #[serde(default)]
    pub groups: Vec<RawGroup>,
}
