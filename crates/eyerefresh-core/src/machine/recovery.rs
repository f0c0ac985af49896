//! Catch-up recovery from a persisted snapshot.
//!
//! Wake-ups are best effort: the process may have been dead when one fired,
//! a reboot may have dropped all of them, or the OS may have delivered one
//! late. [`recover`] reconciles the stored state against wall-clock time and
//! either fast-forwards a transition whose deadline has provably passed or
//! re-issues the effect that keeps the current state alive.
//!
//! Rescheduling is unconditional. Superseding a wake-up that still exists is
//! harmless, and it repairs the case where the wake-up was lost.

use serde::Serialize;

use super::effect::{NotificationKind, SideEffect, TimerId};
use super::state::{AppEvent, AppState, Timestamp};
use super::timing::TimingConfig;
use super::transition::{transition, Transition};

/// What a recovery pass decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum RecoveryAction {
    /// Nothing outstanding.
    Idle,
    /// A deadline passed while nobody was listening; `event` was synthesized.
    FastForwarded { event: AppEvent },
    /// The deadline is still ahead; its wake-up was re-issued.
    Rearmed { timer: TimerId, fire_at: Timestamp },
    /// The state is waiting on the user; its prompt was re-issued.
    Redisplayed { kind: NotificationKind },
}

/// Why recovery is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecoveryTrigger {
    /// Process start or UI attach.
    AppStart,
    /// Device boot; every OS-level wake-up has been cleared.
    Boot,
    /// Periodic backstop against silent wake-up delivery failures.
    HealthCheck,
}

impl std::fmt::Display for RecoveryTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RecoveryTrigger::AppStart => "app_start",
            RecoveryTrigger::Boot => "boot",
            RecoveryTrigger::HealthCheck => "health_check",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recovery {
    pub action: RecoveryAction,
    pub transition: Transition,
    /// How long ago the snapshot was written.
    pub snapshot_age_ms: u64,
}

/// Reconcile a stored snapshot against `now`.
///
/// Only fast-forwards along a time-driven edge (`RefreshDue`,
/// `RefreshTimeUp`); states waiting on the user are never skipped. Running
/// it twice with no intervening event yields the same state both times.
pub fn recover(
    stored: AppState,
    written_at: Timestamp,
    now: Timestamp,
    config: &TimingConfig,
) -> Recovery {
    let snapshot_age_ms = now.saturating_sub(written_at);

    let (action, next) = match stored {
        AppState::Paused => (
            RecoveryAction::Idle,
            Transition { state: stored, effects: Vec::new() },
        ),

        AppState::TimeLeftForNextRefresh { scheduled_at } if scheduled_at <= now => {
            fast_forward(stored, AppEvent::RefreshDue, config, now)
        }
        AppState::TimeLeftForNextRefresh { scheduled_at } => {
            rearm(stored, AppEvent::RefreshDue, scheduled_at)
        }

        AppState::RefreshCanStart => redisplay(stored, NotificationKind::RefreshReminder),

        AppState::RefreshHappening { started_at } => {
            let elapsed = now.saturating_sub(started_at);
            if elapsed >= config.break_duration_ms {
                fast_forward(stored, AppEvent::RefreshTimeUp, config, now)
            } else {
                rearm(
                    stored,
                    AppEvent::RefreshTimeUp,
                    started_at.saturating_add(config.break_duration_ms),
                )
            }
        }

        AppState::WaitingForRefreshAcknowledgement => {
            redisplay(stored, NotificationKind::RefreshComplete)
        }
    };

    Recovery { action, transition: next, snapshot_age_ms }
}

fn fast_forward(
    stored: AppState,
    event: AppEvent,
    config: &TimingConfig,
    now: Timestamp,
) -> (RecoveryAction, Transition) {
    (RecoveryAction::FastForwarded { event }, transition(stored, event, config, now))
}

fn rearm(stored: AppState, event: AppEvent, fire_at: Timestamp) -> (RecoveryAction, Transition) {
    (
        RecoveryAction::Rearmed { timer: TimerId::for_event(event), fire_at },
        Transition {
            state: stored,
            effects: vec![SideEffect::ScheduleEvent { event, fire_at }],
        },
    )
}

fn redisplay(stored: AppState, kind: NotificationKind) -> (RecoveryAction, Transition) {
    (
        RecoveryAction::Redisplayed { kind },
        Transition {
            state: stored,
            effects: vec![SideEffect::ShowNotification { kind }],
        },
    )
}
