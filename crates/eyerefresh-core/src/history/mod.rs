//! Completed-refresh history derived from the event log.

mod range;
mod sessions;

pub use range::{Range, RangeKind};
pub use sessions::{sessions_from_events, CompletedSession};
