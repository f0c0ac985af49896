//! SQLite-backed durable storage.
//!
//! One database file holds everything that has to survive a restart:
//! - The single reminder state snapshot
//! - The append-only event log used for history
//! - Pending wake-ups, keyed by logical timer
//! - The currently visible notification

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{DatabaseError, StoreError};
use crate::machine::{AppEvent, AppState, Timestamp};

use super::data_dir;
use super::migrations;
use super::store::{Snapshot, StateStore};

const DB_FILE: &str = "eyerefresh.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite database for the reminder state and its side tables.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/eyerefresh.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(DatabaseError::DataDir)?;
        Self::open_at(dir.join(DB_FILE))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, DatabaseError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Wipe the snapshot, event log, wake-ups and notification.
    ///
    /// The schema is left in place.
    pub fn reset_data(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "BEGIN;
             DELETE FROM app_state;
             DELETE FROM events;
             DELETE FROM wakeups;
             DELETE FROM notification;
             COMMIT;",
        )?;
        tracing::info!("cleared all stored reminder data");
        Ok(())
    }
}

fn corrupt(reason: impl ToString) -> StoreError {
    StoreError::Corrupt { reason: reason.to_string() }
}

impl StateStore for Database {
    fn get(&self) -> Result<Option<Snapshot>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT state_json, written_at FROM app_state WHERE id = 1",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional();

        let (json, written_at) = match row {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(None),
            Err(
                e @ (rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..)),
            ) => return Err(corrupt(e)),
            Err(e) => return Err(e.into()),
        };

        let state: AppState = serde_json::from_str(&json).map_err(corrupt)?;
        let written_at = Timestamp::try_from(written_at)
            .map_err(|_| corrupt(format!("negative written_at {written_at}")))?;

        Ok(Some(Snapshot { state, written_at }))
    }

    fn put(&self, state: AppState, written_at: Timestamp) -> Result<(), StoreError> {
        let json = serde_json::to_string(&state).map_err(corrupt)?;
        let written_at = i64::try_from(written_at).unwrap_or(i64::MAX);
        self.conn.execute(
            "INSERT INTO app_state (id, state_json, written_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                state_json = excluded.state_json,
                written_at = excluded.written_at",
            params![json, written_at],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM app_state", [])?;
        Ok(())
    }

    /// Holds SQLite's write lock from the first read, so a second process
    /// dispatching against the same file waits out `BUSY_TIMEOUT` instead of
    /// reading a snapshot that is about to be replaced.
    fn atomically<R>(&self, f: impl FnOnce() -> Result<R, StoreError>) -> Result<R, StoreError> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = f()?;
        tx.commit()?;
        Ok(value)
    }

    fn append_event(&self, event: AppEvent, at: Timestamp) -> Result<(), StoreError> {
        self.log_event(event, at)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_has_no_snapshot() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.get().unwrap(), None);
    }

    #[test]
    fn put_then_get_returns_last_write() {
        let db = Database::open_memory().unwrap();
        db.put(AppState::RefreshCanStart, 10).unwrap();
        db.put(AppState::RefreshHappening { started_at: 50 }, 50).unwrap();

        let snap = db.get().unwrap().unwrap();
        assert_eq!(snap.state, AppState::RefreshHappening { started_at: 50 });
        assert_eq!(snap.written_at, 50);
    }

    #[test]
    fn clear_removes_snapshot() {
        let db = Database::open_memory().unwrap();
        db.put(AppState::RefreshCanStart, 10).unwrap();
        db.clear().unwrap();
        assert_eq!(db.get().unwrap(), None);
    }

    #[test]
    fn unparseable_state_is_reported_as_corrupt() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO app_state (id, state_json, written_at) VALUES (1, 'not json', 5)",
                [],
            )
            .unwrap();
        assert!(matches!(db.get(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn unknown_state_tag_is_reported_as_corrupt() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO app_state (id, state_json, written_at) VALUES (1, '{\"type\":\"Dancing\"}', 5)",
                [],
            )
            .unwrap();
        assert!(matches!(db.get(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn wrongly_typed_timestamp_is_reported_as_corrupt() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO app_state (id, state_json, written_at) VALUES (1, '{\"type\":\"Paused\"}', 'yesterday')",
                [],
            )
            .unwrap();
        assert!(matches!(db.get(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn append_event_goes_to_the_log() {
        let db = Database::open_memory().unwrap();
        db.append_event(AppEvent::RefreshStarted, 100).unwrap();
        let events = db.recent_events(10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, AppEvent::RefreshStarted);
    }

    #[test]
    fn failed_atomic_section_discards_its_writes() {
        let db = Database::open_memory().unwrap();
        db.put(AppState::RefreshCanStart, 10).unwrap();

        let result: Result<(), StoreError> = db.atomically(|| {
            db.put(AppState::Paused, 20)?;
            Err(corrupt("abandoned"))
        });

        assert!(result.is_err());
        assert_eq!(db.get().unwrap().map(|s| s.state), Some(AppState::RefreshCanStart));
    }

    #[test]
    fn second_connection_cannot_write_inside_an_atomic_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        let first = Database::open_at(&path).unwrap();
        let second = Database::open_at(&path).unwrap();
        second.conn().busy_timeout(Duration::from_millis(20)).unwrap();

        first
            .atomically(|| {
                first.put(AppState::RefreshCanStart, 10)?;
                let blocked = second.atomically(|| second.put(AppState::Paused, 11));
                assert!(matches!(blocked, Err(StoreError::Unavailable(DatabaseError::Locked))));
                Ok(())
            })
            .unwrap();

        assert_eq!(second.get().unwrap().map(|s| s.state), Some(AppState::RefreshCanStart));
    }

    #[test]
    fn reset_data_empties_every_table() {
        let db = Database::open_memory().unwrap();
        db.put(AppState::RefreshCanStart, 10).unwrap();
        db.append_event(AppEvent::RefreshDue, 10).unwrap();
        db.reset_data().unwrap();
        assert_eq!(db.get().unwrap(), None);
        assert!(db.recent_events(10).unwrap().is_empty());
    }
}
