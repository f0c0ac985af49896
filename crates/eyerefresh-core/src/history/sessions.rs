use serde::Serialize;

use crate::error::DatabaseError;
use crate::machine::{AppEvent, Timestamp};
use crate::storage::{Database, LoggedEvent};

/// One refresh the user confirmed doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletedSession {
    /// Log id of the `RefreshStarted` event that opened the session.
    pub session_id: i64,
    pub started_at: Timestamp,
    pub completed_at: Timestamp,
    pub duration_ms: u64,
}

/// Pair each `MarkRefreshCompleted` with the latest unpaired `RefreshStarted`
/// strictly before it. Newest session first.
///
/// A completion with no open start (its start fell outside the queried
/// window, say) is dropped.
pub fn sessions_from_events(events: &[LoggedEvent]) -> Vec<CompletedSession> {
    let mut ordered: Vec<&LoggedEvent> = events.iter().collect();
    ordered.sort_by_key(|e| (e.timestamp, e.id));

    let mut open: Option<&LoggedEvent> = None;
    let mut sessions = Vec::new();
    for event in ordered {
        match event.event {
            AppEvent::RefreshStarted => open = Some(event),
            AppEvent::MarkRefreshCompleted => {
                if let Some(start) = open.take().filter(|s| s.timestamp < event.timestamp) {
                    sessions.push(CompletedSession {
                        session_id: start.id,
                        started_at: start.timestamp,
                        completed_at: event.timestamp,
                        duration_ms: event.timestamp - start.timestamp,
                    });
                }
            }
            _ => {}
        }
    }

    sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    sessions
}

impl Database {
    /// Sessions whose refresh started in `[start, end)`, newest first.
    ///
    /// A refresh confirmed after `end` still belongs to the window it
    /// started in.
    pub fn sessions_started_between(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<CompletedSession>, DatabaseError> {
        let events = self.events_between(start, Timestamp::MAX)?;
        let mut sessions = sessions_from_events(&events);
        sessions.retain(|s| s.started_at < end);
        Ok(sessions)
    }
}
