//! The pure transition function.
//!
//! ## State Transitions
//!
//! ```text
//! Paused --TurnedOn--> TimeLeftForNextRefresh --Due--> RefreshCanStart
//!   ^                        ^     ^                    |      |
//!   |                        |     +------Snooze--------+      | Started
//!   +---------Paused---------+                                 v
//!                            +--Completed-- WaitingForAck <-TimeUp-- RefreshHappening
//! ```
//!
//! Every `(state, event)` pair has a defined result. Pairs not in the table
//! are identity transitions with no effects.

use serde::Serialize;

use super::effect::{NotificationKind, SideEffect};
use super::state::{AppEvent, AppState, Timestamp};
use super::timing::TimingConfig;

/// Result of feeding one event into one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<SideEffect>,
}

impl Transition {
    fn to(state: AppState, effects: Vec<SideEffect>) -> Self {
        Self { state, effects }
    }

    fn unchanged(state: AppState) -> Self {
        Self { state, effects: Vec::new() }
    }

    /// True when `self` is the no-op result of applying an event to `from`.
    pub fn is_identity(&self, from: &AppState) -> bool {
        self.state == *from && self.effects.is_empty()
    }
}

/// Compute the next state and the effects it requires.
///
/// Never panics and performs no I/O; `now` is the only clock read and is
/// supplied by the caller.
pub fn transition(
    state: AppState,
    event: AppEvent,
    config: &TimingConfig,
    now: Timestamp,
) -> Transition {
    use AppEvent as E;
    use AppState as S;

    match (state, event) {
        (S::Paused, E::SchedulingTurnedOn) => schedule_reminder(now, config.reminder_interval_ms),

        (S::TimeLeftForNextRefresh { .. }, E::SchedulingPaused)
        | (S::RefreshCanStart, E::SchedulingPaused) => Transition::to(
            S::Paused,
            vec![SideEffect::StopTimer, SideEffect::ClearNotification],
        ),

        (S::TimeLeftForNextRefresh { .. }, E::RefreshDue) => Transition::to(
            S::RefreshCanStart,
            vec![SideEffect::ShowNotification { kind: NotificationKind::RefreshReminder }],
        ),

        (S::RefreshCanStart, E::SnoozeRequested) => {
            let mut next = schedule_reminder(now, config.snooze_duration_ms);
            next.effects.push(SideEffect::ClearNotification);
            next
        }

        (S::RefreshCanStart, E::RefreshStarted) => Transition::to(
            S::RefreshHappening { started_at: now },
            vec![
                SideEffect::ScheduleEvent {
                    event: E::RefreshTimeUp,
                    fire_at: now.saturating_add(config.break_duration_ms),
                },
                SideEffect::ClearNotification,
            ],
        ),

        (S::RefreshHappening { .. }, E::RefreshTimeUp) => Transition::to(
            S::WaitingForRefreshAcknowledgement,
            vec![SideEffect::ShowNotification { kind: NotificationKind::RefreshComplete }],
        ),

        (S::WaitingForRefreshAcknowledgement, E::MarkRefreshCompleted) => {
            let mut next = schedule_reminder(now, config.reminder_interval_ms);
            next.effects.push(SideEffect::ClearNotification);
            next
        }

        (S::WaitingForRefreshAcknowledgement, E::RefreshCouldNotHappen) => Transition::to(
            S::RefreshCanStart,
            vec![
                SideEffect::ClearNotification,
                SideEffect::ShowNotification { kind: NotificationKind::RefreshReminder },
            ],
        ),

        (current, _) => Transition::unchanged(current),
    }
}

fn schedule_reminder(now: Timestamp, delay_ms: u64) -> Transition {
    let fire_at = now.saturating_add(delay_ms);
    Transition::to(
        AppState::TimeLeftForNextRefresh { scheduled_at: fire_at },
        vec![SideEffect::ScheduleEvent { event: AppEvent::RefreshDue, fire_at }],
    )
}
