use serde::{Deserialize, Serialize};

/// Durations, in milliseconds, supplied to every transition.
///
/// Treated as an immutable snapshot for the length of one call. Changing it
/// only affects the next deadline that gets computed; deadlines already
/// stored in a state are never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval_ms: u64,
    #[serde(default = "default_break_duration")]
    pub break_duration_ms: u64,
    #[serde(default = "default_snooze_duration")]
    pub snooze_duration_ms: u64,
    #[serde(default = "default_extended_snooze_duration")]
    pub extended_snooze_duration_ms: u64,
}

fn default_reminder_interval() -> u64 {
    20 * 60 * 1000
}
fn default_break_duration() -> u64 {
    20 * 1000
}
fn default_snooze_duration() -> u64 {
    2 * 60 * 1000
}
fn default_extended_snooze_duration() -> u64 {
    5 * 60 * 1000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reminder_interval_ms: default_reminder_interval(),
            break_duration_ms: default_break_duration(),
            snooze_duration_ms: default_snooze_duration(),
            extended_snooze_duration_ms: default_extended_snooze_duration(),
        }
    }
}
