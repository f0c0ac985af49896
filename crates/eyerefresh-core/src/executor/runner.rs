//! Effect execution.

use crate::error::Result;
use crate::machine::{SideEffect, TimerId};

use super::log::{EffectResult, ExecutionLog, ExecutionStatus};
use super::traits::{Notifier, Scheduler};

/// Executes effects in order against a scheduler and a notifier.
///
/// A failing effect is logged and the batch carries on; nothing here rolls
/// back the state that produced the effects.
pub struct EffectExecutor<W, N> {
    scheduler: W,
    notifier: N,
}

impl<W: Scheduler, N: Notifier> EffectExecutor<W, N> {
    pub fn new(scheduler: W, notifier: N) -> Self {
        Self { scheduler, notifier }
    }

    /// Execute a batch of effects and return the log
    pub fn execute(&self, effects: &[SideEffect]) -> ExecutionLog {
        let results = effects
            .iter()
            .map(|effect| {
                let status = match self.execute_one(effect) {
                    Ok(()) => ExecutionStatus::Success,
                    Err(e) => {
                        tracing::warn!(?effect, error = %e, "effect failed");
                        ExecutionStatus::Failed { reason: e.to_string() }
                    }
                };
                EffectResult { effect: *effect, status }
            })
            .collect();

        ExecutionLog::new(results)
    }

    fn execute_one(&self, effect: &SideEffect) -> Result<()> {
        match *effect {
            SideEffect::ScheduleEvent { event, fire_at } => {
                self.scheduler.schedule(event, fire_at, TimerId::for_event(event))
            }
            SideEffect::ShowNotification { kind } => self.notifier.show(kind, kind.options()),
            SideEffect::StopTimer => {
                // Try every timer even if one refuses; report the first failure.
                let mut first_err = None;
                for timer in TimerId::ALL {
                    if let Err(e) = self.scheduler.cancel(timer) {
                        first_err.get_or_insert(e);
                    }
                }
                first_err.map_or(Ok(()), Err)
            }
            SideEffect::ClearNotification => self.notifier.clear(),
        }
    }
}
