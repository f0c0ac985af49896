use clap::Subcommand;
use eyerefresh_core::storage::{ActiveNotification, PendingWakeup};
use eyerefresh_core::{
    now_ms, AppEvent, AppState, Dispatcher, NotificationKind, NotificationOption, RecoveryTrigger,
    StateStore, Timestamp,
};
use serde::Serialize;

use super::{load_config, open_db, print_json, CliResult};
use crate::terminal::TerminalNotifier;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Start scheduling reminders
    On,
    /// Stop scheduling and dismiss any prompt
    Pause,
    /// Put off the current reminder
    Snooze,
    /// Start the refresh now
    Begin,
    /// Confirm the refresh was done
    Done,
    /// Report the refresh could not happen
    Missed,
    /// Answer the visible prompt by option number (1-based)
    Respond {
        option: usize,
    },
    /// Print current state, prompt and pending wake-ups as JSON
    Status,
}

impl ReminderAction {
    fn event(&self) -> Option<AppEvent> {
        match self {
            ReminderAction::On => Some(AppEvent::SchedulingTurnedOn),
            ReminderAction::Pause => Some(AppEvent::SchedulingPaused),
            ReminderAction::Snooze => Some(AppEvent::SnoozeRequested),
            ReminderAction::Begin => Some(AppEvent::RefreshStarted),
            ReminderAction::Done => Some(AppEvent::MarkRefreshCompleted),
            ReminderAction::Missed => Some(AppEvent::RefreshCouldNotHappen),
            ReminderAction::Respond { .. } | ReminderAction::Status => None,
        }
    }
}

#[derive(Serialize)]
struct NotificationView {
    kind: NotificationKind,
    title: &'static str,
    text: &'static str,
    shown_at: Timestamp,
    options: &'static [NotificationOption],
}

impl From<ActiveNotification> for NotificationView {
    fn from(active: ActiveNotification) -> Self {
        Self {
            kind: active.kind,
            title: active.kind.title(),
            text: active.kind.text(),
            shown_at: active.shown_at,
            options: active.kind.options(),
        }
    }
}

#[derive(Serialize)]
struct Status {
    state: AppState,
    written_at: Option<Timestamp>,
    notification: Option<NotificationView>,
    wakeups: Vec<PendingWakeup>,
}

pub fn run(action: ReminderAction) -> CliResult {
    let db = open_db()?;
    let config = load_config();
    let notifier = TerminalNotifier::new(&db);
    let mut dispatcher = Dispatcher::new(&db, &db, &notifier);

    // Each invocation attaches to the loop, so first catch up on whatever
    // came due while nothing was running.
    let now = now_ms();
    dispatcher.recover(RecoveryTrigger::AppStart, &config.timing, now)?;

    let event = match action {
        ReminderAction::Status => {
            let snapshot = db.get()?;
            let status = Status {
                state: snapshot.map(|s| s.state).unwrap_or_default(),
                written_at: snapshot.map(|s| s.written_at),
                notification: db.active_notification()?.map(NotificationView::from),
                wakeups: db.pending_wakeups()?,
            };
            return print_json(&status);
        }
        ReminderAction::Respond { option } => {
            let active = db
                .active_notification()?
                .ok_or("no notification is showing")?;
            let options = active.kind.options();
            option
                .checked_sub(1)
                .and_then(|i| options.get(i))
                .map(|o| o.event)
                .ok_or_else(|| {
                    format!("option must be between 1 and {} for {}", options.len(), active.kind)
                })?
        }
        other => other.event().ok_or("action carries no event")?,
    };

    let outcome = dispatcher.on_event(event, &config.timing, now)?;
    print_json(&outcome)
}
