//! # Eyerefresh Core Library
//!
//! This library provides the core logic for eyerefresh, a durable reminder
//! loop for periodic eye breaks. Everything is usable through the standalone
//! `eyerefresh` CLI; any other front end is a thin layer over the same crate.
//!
//! ## Architecture
//!
//! - **Machine**: a pure, total transition function over closed state, event
//!   and effect enums, plus a recovery pass that reconciles a stored snapshot
//!   against wall-clock time
//! - **Executor**: carries effects out through the `Scheduler` and `Notifier`
//!   collaborator traits
//! - **Storage**: SQLite-backed snapshot, wake-ups, notification and event log,
//!   and TOML configuration
//! - **History**: completed-refresh sessions derived from the event log
//!
//! ## Key Components
//!
//! - [`transition`]: the pure state machine
//! - [`recover`]: catch-up after missed, late or cleared wake-ups
//! - [`Dispatcher`]: read, compute, write, execute
//! - [`Database`]: durable storage and the default collaborators
//! - [`Config`]: application configuration management

pub mod dispatch;
pub mod error;
pub mod executor;
pub mod history;
pub mod machine;
pub mod storage;

pub use dispatch::{DispatchOutcome, Dispatcher, RecoveryOutcome};
pub use error::{ConfigError, CoreError, DatabaseError, StoreError};
pub use executor::{EffectExecutor, ExecutionLog, Notifier, Scheduler};
pub use history::{sessions_from_events, CompletedSession, Range, RangeKind};
pub use machine::{
    now_ms, recover, transition, AppEvent, AppState, NotificationKind, NotificationOption,
    RecoveryAction, RecoveryTrigger, SideEffect, TimerId, Timestamp, TimingConfig, Transition,
};
pub use storage::{Config, DaemonConfig, Database, LoggedEvent, Snapshot, StateStore};
