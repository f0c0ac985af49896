//! Carrying out side effects.
//!
//! The state machine only describes effects. Executing them goes through two
//! collaborator traits, [`Scheduler`] and [`Notifier`], and every attempt is
//! recorded in an [`ExecutionLog`].

mod log;
mod runner;
mod traits;

pub use log::{EffectResult, ExecutionLog, ExecutionStatus};
pub use runner::EffectExecutor;
pub use traits::{Notifier, Scheduler};
