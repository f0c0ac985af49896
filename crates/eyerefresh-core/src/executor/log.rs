//! Effect execution logging.

use serde::Serialize;

use crate::machine::SideEffect;

/// Result of executing a single effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectResult {
    pub effect: SideEffect,
    pub status: ExecutionStatus,
}

/// Status of effect execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    /// The collaborator refused; recovery will re-issue if the state needs it.
    Failed { reason: String },
}

/// Log of one batch of effects, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionLog {
    pub results: Vec<EffectResult>,
}

impl ExecutionLog {
    pub fn new(results: Vec<EffectResult>) -> Self {
        Self { results }
    }

    /// Get the number of successful effects
    pub fn success_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, ExecutionStatus::Success))
            .count()
    }

    /// Get the number of failed effects
    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, ExecutionStatus::Failed { .. }))
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }
}
