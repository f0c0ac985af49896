//! Reminder states and the events that move between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// The single "current" state of the reminder loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppState {
    /// Reminders are disabled.
    #[default]
    Paused,
    /// Counting down to the next break prompt.
    TimeLeftForNextRefresh { scheduled_at: Timestamp },
    /// The prompt has fired; waiting for the user to start or snooze.
    RefreshCanStart,
    /// A break is in progress.
    RefreshHappening { started_at: Timestamp },
    /// The break timer elapsed; waiting for the user to confirm.
    WaitingForRefreshAcknowledgement,
}

impl AppState {
    pub const fn name(&self) -> &'static str {
        match self {
            AppState::Paused => "Paused",
            AppState::TimeLeftForNextRefresh { .. } => "TimeLeftForNextRefresh",
            AppState::RefreshCanStart => "RefreshCanStart",
            AppState::RefreshHappening { .. } => "RefreshHappening",
            AppState::WaitingForRefreshAcknowledgement => "WaitingForRefreshAcknowledgement",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppState::TimeLeftForNextRefresh { scheduled_at } => {
                write!(f, "{}({scheduled_at})", self.name())
            }
            AppState::RefreshHappening { started_at } => write!(f, "{}({started_at})", self.name()),
            other => f.write_str(other.name()),
        }
    }
}

/// Something that happened to the reminder loop.
///
/// Events carry no timestamp; the time of occurrence is supplied as `now`
/// when the transition runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppEvent {
    SchedulingTurnedOn,
    SchedulingPaused,
    RefreshDue,
    SnoozeRequested,
    RefreshStarted,
    RefreshTimeUp,
    MarkRefreshCompleted,
    RefreshCouldNotHappen,
}

impl AppEvent {
    pub const ALL: [AppEvent; 8] = [
        AppEvent::SchedulingTurnedOn,
        AppEvent::SchedulingPaused,
        AppEvent::RefreshDue,
        AppEvent::SnoozeRequested,
        AppEvent::RefreshStarted,
        AppEvent::RefreshTimeUp,
        AppEvent::MarkRefreshCompleted,
        AppEvent::RefreshCouldNotHappen,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            AppEvent::SchedulingTurnedOn => "SchedulingTurnedOn",
            AppEvent::SchedulingPaused => "SchedulingPaused",
            AppEvent::RefreshDue => "RefreshDue",
            AppEvent::SnoozeRequested => "SnoozeRequested",
            AppEvent::RefreshStarted => "RefreshStarted",
            AppEvent::RefreshTimeUp => "RefreshTimeUp",
            AppEvent::MarkRefreshCompleted => "MarkRefreshCompleted",
            AppEvent::RefreshCouldNotHappen => "RefreshCouldNotHappen",
        }
    }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a persisted event name is not one of [`AppEvent::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for AppEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppEvent::ALL
            .into_iter()
            .find(|event| event.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as Timestamp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_parse_back() {
        for event in AppEvent::ALL {
            assert_eq!(event.name().parse::<AppEvent>(), Ok(event));
        }
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let err = "NotificationDue".parse::<AppEvent>().unwrap_err();
        assert_eq!(err, UnknownEvent("NotificationDue".to_string()));
    }

    #[test]
    fn state_serializes_with_type_tag() {
        let state = AppState::TimeLeftForNextRefresh { scheduled_at: 42 };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"type":"TimeLeftForNextRefresh","scheduled_at":42}"#);
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn default_state_is_paused() {
        assert_eq!(AppState::default(), AppState::Paused);
    }
}
