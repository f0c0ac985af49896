//! Append-only log of committed events.

use rusqlite::params;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::machine::{AppEvent, Timestamp};

use super::Database;

/// One committed event as recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoggedEvent {
    pub id: i64,
    pub event: AppEvent,
    pub timestamp: Timestamp,
}

fn to_sql_ts(ts: Timestamp) -> i64 {
    i64::try_from(ts).unwrap_or(i64::MAX)
}

impl Database {
    /// Record an event at `at`.
    pub fn log_event(&self, event: AppEvent, at: Timestamp) -> Result<(), DatabaseError> {
        self.conn().execute(
            "INSERT INTO events (event, timestamp) VALUES (?1, ?2)",
            params![event.name(), to_sql_ts(at)],
        )?;
        Ok(())
    }

    /// Events with `start <= timestamp < end`, oldest first.
    pub fn events_between(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<LoggedEvent>, DatabaseError> {
        self.query_events(
            "SELECT id, event, timestamp FROM events
             WHERE timestamp >= ?1 AND timestamp < ?2
             ORDER BY timestamp ASC, id ASC",
            params![to_sql_ts(start), to_sql_ts(end)],
        )
    }

    /// The newest `limit` events, newest first.
    pub fn recent_events(&self, limit: usize) -> Result<Vec<LoggedEvent>, DatabaseError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_events(
            "SELECT id, event, timestamp FROM events
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
            params![limit],
        )
    }

    fn query_events(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<LoggedEvent>, DatabaseError> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, name, timestamp) = row?;
            // Rows written by a newer build may carry events this one doesn't know.
            let Ok(event) = name.parse::<AppEvent>() else {
                tracing::warn!(id, event = %name, "skipping unknown event in log");
                continue;
            };
            events.push(LoggedEvent {
                id,
                event,
                timestamp: Timestamp::try_from(timestamp).unwrap_or(0),
            });
        }
        Ok(events)
    }
}
