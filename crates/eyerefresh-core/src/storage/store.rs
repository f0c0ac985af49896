use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::machine::{AppEvent, AppState, Timestamp};

/// The last committed state and when it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: AppState,
    pub written_at: Timestamp,
}

/// Durable single-record storage for the reminder state.
///
/// Last write wins, and the record must survive process restart. Methods
/// take `&self`; implementations that need mutation use interior mutability
/// (SQLite connections already do).
///
/// Stores shared between processes must override [`StateStore::atomically`]
/// so that a read and the write computed from it cannot interleave with
/// another writer.
pub trait StateStore {
    /// The committed snapshot, or `None` on a fresh install.
    fn get(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Durably replace the snapshot. Must not return until the write is
    /// committed.
    fn put(&self, state: AppState, written_at: Timestamp) -> Result<(), StoreError>;

    /// Drop the snapshot; the next `get` returns `None`.
    fn clear(&self) -> Result<(), StoreError>;

    /// Run `f` as one exclusive read-modify-write section.
    ///
    /// Everything `f` writes commits together when it returns `Ok`, and is
    /// discarded when it returns `Err`. The default runs `f` directly, which
    /// is enough for a store owned by a single dispatcher.
    fn atomically<R>(&self, f: impl FnOnce() -> Result<R, StoreError>) -> Result<R, StoreError> {
        f()
    }

    /// Append a committed event to the history log.
    ///
    /// The log is for reporting only and never consulted by recovery.
    fn append_event(&self, _event: AppEvent, _at: Timestamp) -> Result<(), StoreError> {
        Ok(()) // default no-op
    }
}
