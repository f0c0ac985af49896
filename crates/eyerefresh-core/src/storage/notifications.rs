//! The single visible notification.

use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::error::{CoreError, DatabaseError, Result};
use crate::executor::Notifier;
use crate::machine::{now_ms, NotificationKind, NotificationOption, Timestamp};

use super::Database;

/// The prompt currently shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveNotification {
    pub kind: NotificationKind,
    pub shown_at: Timestamp,
}

impl Database {
    pub fn active_notification(&self) -> Result<Option<ActiveNotification>, DatabaseError> {
        let raw: Option<(String, i64)> = self
            .conn()
            .query_row("SELECT kind, shown_at FROM notification WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;

        Ok(raw.and_then(|(kind, shown_at)| match kind.parse::<NotificationKind>() {
            Ok(kind) => Some(ActiveNotification {
                kind,
                shown_at: Timestamp::try_from(shown_at).unwrap_or(0),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable notification row");
                None
            }
        }))
    }
}

impl Notifier for Database {
    fn show(&self, kind: NotificationKind, _options: &[NotificationOption]) -> Result<()> {
        let shown_at = i64::try_from(now_ms()).unwrap_or(i64::MAX);
        self.conn()
            .execute(
                "INSERT INTO notification (id, kind, shown_at) VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET kind = excluded.kind, shown_at = excluded.shown_at",
                params![kind.name(), shown_at],
            )
            .map_err(|e| CoreError::notifier(e.to_string()))?;
        tracing::debug!(%kind, "notification shown");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.conn()
            .execute("DELETE FROM notification", [])
            .map_err(|e| CoreError::notifier(e.to_string()))?;
        Ok(())
    }
}
