//! Side effects requested by a transition.
//!
//! Effects are plain values. The transition function only returns them;
//! [`crate::executor::EffectExecutor`] is what carries them out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::{AppEvent, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SideEffect {
    /// Request a single future wake-up carrying `event`, replacing any
    /// earlier wake-up of the same logical timer.
    ScheduleEvent { event: AppEvent, fire_at: Timestamp },
    ShowNotification { kind: NotificationKind },
    /// Cancel every outstanding wake-up.
    StopTimer,
    /// Dismiss any visible prompt.
    ClearNotification,
}

/// The two prompts the user can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    RefreshReminder,
    RefreshComplete,
}

/// A user-actionable button on a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationOption {
    pub label: &'static str,
    pub event: AppEvent,
}

const REMINDER_OPTIONS: [NotificationOption; 3] = [
    NotificationOption { label: "Start Refresh", event: AppEvent::RefreshStarted },
    NotificationOption { label: "Snooze", event: AppEvent::SnoozeRequested },
    NotificationOption { label: "Pause", event: AppEvent::SchedulingPaused },
];

const COMPLETE_OPTIONS: [NotificationOption; 2] = [
    NotificationOption { label: "I did it!", event: AppEvent::MarkRefreshCompleted },
    NotificationOption { label: "I couldn't do it", event: AppEvent::RefreshCouldNotHappen },
];

impl NotificationKind {
    pub const fn name(&self) -> &'static str {
        match self {
            NotificationKind::RefreshReminder => "RefreshReminder",
            NotificationKind::RefreshComplete => "RefreshComplete",
        }
    }

    pub const fn title(&self) -> &'static str {
        match self {
            NotificationKind::RefreshReminder => "Eye Refresh",
            NotificationKind::RefreshComplete => "Eye Refresh Complete",
        }
    }

    pub const fn text(&self) -> &'static str {
        match self {
            NotificationKind::RefreshReminder => "Time for your eye refresh!",
            NotificationKind::RefreshComplete => "Great job! Your eye refresh is complete.",
        }
    }

    /// The fixed set of options shown with this prompt.
    pub fn options(&self) -> &'static [NotificationOption] {
        match self {
            NotificationKind::RefreshReminder => &REMINDER_OPTIONS,
            NotificationKind::RefreshComplete => &COMPLETE_OPTIONS,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RefreshReminder" => Ok(NotificationKind::RefreshReminder),
            "RefreshComplete" => Ok(NotificationKind::RefreshComplete),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// Identity under which a wake-up is tracked for cancel/replace.
///
/// There is one timer per purpose, so two in-flight wake-ups for the same
/// purpose can never coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerId {
    /// Counts down to the next break prompt.
    NextReminder,
    /// Counts down the break itself.
    BreakCountdown,
}

impl TimerId {
    pub const ALL: [TimerId; 2] = [TimerId::NextReminder, TimerId::BreakCountdown];

    /// The logical timer a wake-up carrying `event` belongs to.
    pub fn for_event(event: AppEvent) -> TimerId {
        match event {
            AppEvent::RefreshTimeUp => TimerId::BreakCountdown,
            _ => TimerId::NextReminder,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TimerId::NextReminder => "next_reminder",
            TimerId::BreakCountdown => "break_countdown",
        }
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimerId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown timer id: {s}"))
    }
}
