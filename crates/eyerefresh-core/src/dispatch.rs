//! The single entry point that ties the pure machine to storage and effects.
//!
//! Every event, whether a user action, a fired wake-up, or an event
//! synthesized by recovery, goes through the same sequence:
//!
//! 1. read the snapshot
//! 2. compute the transition
//! 3. durably write the new state
//! 4. execute the effects
//!
//! Steps 1 to 3 form one exclusive section of the store. Effects only run
//! after it commits.
//!
//! A crash between 3 and 4 leaves a committed state whose effects never ran;
//! the next recovery pass re-issues them.

use serde::Serialize;

use crate::error::StoreError;
use crate::executor::{EffectExecutor, ExecutionLog, Notifier, Scheduler};
use crate::machine::{
    recover, transition, AppEvent, AppState, RecoveryAction, RecoveryTrigger, SideEffect,
    Timestamp, TimingConfig,
};
use crate::storage::{Snapshot, StateStore};

/// What a single `on_event` call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub event: AppEvent,
    pub from: AppState,
    pub to: AppState,
    /// False for identity transitions, which write nothing.
    pub committed: bool,
    /// The stored snapshot was unreadable and dispatch started from `Paused`.
    pub recovered_from_corruption: bool,
    pub execution: ExecutionLog,
}

/// What a single `recover` call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryOutcome {
    pub trigger: RecoveryTrigger,
    pub action: RecoveryAction,
    pub from: AppState,
    pub to: AppState,
    pub snapshot_age_ms: u64,
    pub execution: ExecutionLog,
}

/// Runs events and recovery passes against injected collaborators.
///
/// Takes `&mut self` so that only one transition is ever in flight through a
/// given dispatcher. Across dispatchers (another process on the same
/// database, say) read, compute and write run inside
/// [`StateStore::atomically`].
pub struct Dispatcher<'a, S, W, N> {
    store: &'a S,
    executor: EffectExecutor<&'a W, &'a N>,
    collaborator_failures: u64,
}

impl<'a, S, W, N> Dispatcher<'a, S, W, N>
where
    S: StateStore,
    W: Scheduler,
    N: Notifier,
{
    pub fn new(store: &'a S, scheduler: &'a W, notifier: &'a N) -> Self {
        Self {
            store,
            executor: EffectExecutor::new(scheduler, notifier),
            collaborator_failures: 0,
        }
    }

    /// Total scheduler/notifier failures seen by this dispatcher.
    pub fn collaborator_failures(&self) -> u64 {
        self.collaborator_failures
    }

    /// Read the snapshot, resetting a corrupt one to `Paused`.
    ///
    /// Returns the snapshot (if any) and whether a reset happened.
    fn load(&self, now: Timestamp) -> Result<(Option<Snapshot>, bool), StoreError> {
        match self.store.get() {
            Ok(snapshot) => Ok((snapshot, false)),
            Err(StoreError::Corrupt { reason }) => {
                tracing::warn!(%reason, "stored state is corrupt, resetting to Paused");
                self.store.put(AppState::Paused, now)?;
                Ok((
                    Some(Snapshot { state: AppState::Paused, written_at: now }),
                    true,
                ))
            }
            Err(e) => Err(e),
        }
    }

    fn run_effects(&mut self, effects: &[SideEffect]) -> ExecutionLog {
        let log = self.executor.execute(effects);
        self.collaborator_failures += log.failure_count() as u64;
        log
    }

    /// Feed one event through read, compute, write, execute.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be locked or read, or the new
    /// state cannot be written. In every case no effect has run.
    pub fn on_event(
        &mut self,
        event: AppEvent,
        config: &TimingConfig,
        now: Timestamp,
    ) -> Result<DispatchOutcome, StoreError> {
        let (from, next, recovered_from_corruption) = self.store.atomically(|| {
            let (snapshot, recovered_from_corruption) = self.load(now)?;
            let from = snapshot.map(|s| s.state).unwrap_or_default();
            let next = transition(from, event, config, now);
            if !next.is_identity(&from) {
                self.store.put(next.state, now)?;
                if let Err(e) = self.store.append_event(event, now) {
                    tracing::warn!(%event, error = %e, "failed to append to event log");
                }
            }
            Ok((from, next, recovered_from_corruption))
        })?;

        if next.is_identity(&from) {
            tracing::debug!(%event, state = %from, "event ignored");
            return Ok(DispatchOutcome {
                event,
                from,
                to: from,
                committed: false,
                recovered_from_corruption,
                execution: ExecutionLog::default(),
            });
        }

        let execution = self.run_effects(&next.effects);
        tracing::info!(
            %event,
            from = %from,
            to = %next.state,
            succeeded = execution.success_count(),
            failed = execution.failure_count(),
            "transition committed"
        );

        Ok(DispatchOutcome {
            event,
            from,
            to: next.state,
            committed: true,
            recovered_from_corruption,
            execution,
        })
    }

    /// Reconcile the stored state with `now` and re-issue whatever keeps it
    /// alive.
    ///
    /// An unreadable store is treated as `Paused`, so this only fails when the
    /// store cannot be locked or a fast-forwarded state cannot be written.
    pub fn recover(
        &mut self,
        trigger: RecoveryTrigger,
        config: &TimingConfig,
        now: Timestamp,
    ) -> Result<RecoveryOutcome, StoreError> {
        let (from, recovery) = self.store.atomically(|| {
            let snapshot = match self.load(now) {
                Ok((snapshot, _)) => snapshot,
                Err(e) => {
                    tracing::warn!(
                        %trigger,
                        error = %e,
                        "state store unreadable, treating as Paused"
                    );
                    None
                }
            };
            let Snapshot { state: from, written_at } =
                snapshot.unwrap_or(Snapshot { state: AppState::Paused, written_at: now });

            let recovery = recover(from, written_at, now, config);
            if recovery.transition.state != from {
                self.store.put(recovery.transition.state, now)?;
                if let RecoveryAction::FastForwarded { event } = recovery.action {
                    if let Err(e) = self.store.append_event(event, now) {
                        tracing::warn!(%event, error = %e, "failed to append to event log");
                    }
                }
            }
            Ok((from, recovery))
        })?;
        let to = recovery.transition.state;

        let execution = self.run_effects(&recovery.transition.effects);
        tracing::info!(
            %trigger,
            action = ?recovery.action,
            from = %from,
            to = %to,
            snapshot_age_ms = recovery.snapshot_age_ms,
            succeeded = execution.success_count(),
            failed = execution.failure_count(),
            "recovery pass finished"
        );

        Ok(RecoveryOutcome {
            trigger,
            action: recovery.action,
            from,
            to,
            snapshot_age_ms: recovery.snapshot_age_ms,
            execution,
        })
    }
}
