//! Durable wake-ups, one per logical timer.
//!
//! The database stands in for an OS alarm service: `schedule` upserts a row
//! keyed by timer, and a polling loop drains the rows that have come due.

use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::error::{CoreError, DatabaseError, Result};
use crate::executor::Scheduler;
use crate::machine::{AppEvent, Timestamp, TimerId};

use super::Database;

/// A wake-up waiting to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingWakeup {
    pub timer: TimerId,
    pub event: AppEvent,
    pub fire_at: Timestamp,
}

type RawWakeup = (String, String, i64);

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawWakeup> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn parse_wakeup((timer, event, fire_at): RawWakeup) -> Option<PendingWakeup> {
    match (timer.parse::<TimerId>(), event.parse::<AppEvent>()) {
        (Ok(timer), Ok(event)) => Some(PendingWakeup {
            timer,
            event,
            fire_at: Timestamp::try_from(fire_at).unwrap_or(0),
        }),
        _ => {
            tracing::warn!(%timer, %event, "dropping unreadable wake-up");
            None
        }
    }
}

impl Database {
    /// All pending wake-ups, soonest first.
    pub fn pending_wakeups(&self) -> Result<Vec<PendingWakeup>, DatabaseError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT timer_id, event, fire_at FROM wakeups ORDER BY fire_at ASC")?;
        let rows = stmt.query_map([], read_raw)?;

        let mut wakeups = Vec::new();
        for row in rows {
            wakeups.extend(parse_wakeup(row?));
        }
        Ok(wakeups)
    }

    /// The pending wake-up for one timer, if any.
    pub fn wakeup_for(&self, timer: TimerId) -> Result<Option<PendingWakeup>, DatabaseError> {
        let raw: Option<RawWakeup> = self
            .conn()
            .query_row(
                "SELECT timer_id, event, fire_at FROM wakeups WHERE timer_id = ?1",
                [timer.as_str()],
                read_raw,
            )
            .optional()?;
        Ok(raw.and_then(parse_wakeup))
    }

    /// Remove and return every wake-up with `fire_at <= now`, soonest first.
    ///
    /// Runs in one transaction, so a wake-up is handed out at most once even
    /// with several pollers on the same file.
    pub fn take_due_wakeups(&self, now: Timestamp) -> Result<Vec<PendingWakeup>, DatabaseError> {
        let now = i64::try_from(now).unwrap_or(i64::MAX);
        let tx = self.conn().unchecked_transaction()?;

        let raw: Vec<RawWakeup> = {
            let mut stmt = tx.prepare(
                "SELECT timer_id, event, fire_at FROM wakeups
                 WHERE fire_at <= ?1 ORDER BY fire_at ASC",
            )?;
            let rows = stmt.query_map([now], read_raw)?;
            rows.collect::<Result<_, rusqlite::Error>>()?
        };
        tx.execute("DELETE FROM wakeups WHERE fire_at <= ?1", [now])?;
        tx.commit()?;

        Ok(raw.into_iter().filter_map(parse_wakeup).collect())
    }
}

impl Scheduler for Database {
    fn schedule(&self, event: AppEvent, fire_at: Timestamp, timer: TimerId) -> Result<()> {
        let fire_at = i64::try_from(fire_at).unwrap_or(i64::MAX);
        self.conn()
            .execute(
                "INSERT INTO wakeups (timer_id, event, fire_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(timer_id) DO UPDATE SET
                    event = excluded.event,
                    fire_at = excluded.fire_at",
                params![timer.as_str(), event.name(), fire_at],
            )
            .map_err(|e| CoreError::scheduler(e.to_string()))?;
        tracing::debug!(%timer, %event, fire_at, "wake-up scheduled");
        Ok(())
    }

    fn cancel(&self, timer: TimerId) -> Result<()> {
        self.conn()
            .execute("DELETE FROM wakeups WHERE timer_id = ?1", [timer.as_str()])
            .map_err(|e| CoreError::scheduler(e.to_string()))?;
        Ok(())
    }
}
