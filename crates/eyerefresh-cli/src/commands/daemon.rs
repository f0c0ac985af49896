//! Foreground wake-up loop.
//!
//! Stands in for an OS alarm service: polls the `wakeups` table, feeds due
//! events to the dispatcher, and runs a periodic recovery pass as a backstop
//! against anything the polling missed.

use std::time::Duration;

use clap::Args;
use eyerefresh_core::{now_ms, Database, Dispatcher, RecoveryTrigger};
use tokio::time::MissedTickBehavior;

use super::{load_config, open_db, CliResult};
use crate::terminal::TerminalNotifier;

/// Floor for both daemon intervals. tokio panics on a zero period.
const MIN_TICK_MS: u64 = 1_000;

#[derive(Args)]
pub struct DaemonArgs {
    /// Recover, fire whatever is due, then exit
    #[arg(long)]
    once: bool,
}

pub fn run(args: DaemonArgs) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop(args.once))
}

async fn run_loop(once: bool) -> CliResult {
    let db = open_db()?;
    let config = load_config();

    run_recovery(&db, RecoveryTrigger::AppStart);
    fire_due(&db);
    if once {
        return Ok(());
    }

    let poll_ms = config.daemon.poll_interval_ms.max(MIN_TICK_MS);
    let health_ms = config.health_check_interval_ms().max(MIN_TICK_MS);
    tracing::info!(poll_ms, health_ms, "daemon started");

    let mut poll = tokio::time::interval(Duration::from_millis(poll_ms));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut health = tokio::time::interval(Duration::from_millis(health_ms));
    health.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Both intervals tick immediately; startup already covered that.
    poll.tick().await;
    health.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = poll.tick() => fire_due(&db),
            _ = health.tick() => run_recovery(&db, RecoveryTrigger::HealthCheck),
            _ = &mut shutdown => {
                tracing::info!("daemon stopping");
                break;
            }
        }
    }

    Ok(())
}

/// Deliver every due wake-up. Failures are logged; the next health check
/// repairs whatever they left behind.
fn fire_due(db: &Database) {
    let now = now_ms();
    let due = match db.take_due_wakeups(now) {
        Ok(due) => due,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read due wake-ups");
            return;
        }
    };
    if due.is_empty() {
        return;
    }

    let config = load_config();
    let notifier = TerminalNotifier::new(db);
    let mut dispatcher = Dispatcher::new(db, db, &notifier);
    for wakeup in due {
        let lateness_ms = now.saturating_sub(wakeup.fire_at);
        tracing::debug!(timer = %wakeup.timer, event = %wakeup.event, lateness_ms, "wake-up fired");
        if let Err(e) = dispatcher.on_event(wakeup.event, &config.timing, now) {
            tracing::warn!(event = %wakeup.event, error = %e, "failed to dispatch wake-up");
        }
    }
}

fn run_recovery(db: &Database, trigger: RecoveryTrigger) {
    let config = load_config();
    let notifier = TerminalNotifier::new(db);
    let mut dispatcher = Dispatcher::new(db, db, &notifier);
    match dispatcher.recover(trigger, &config.timing, now_ms()) {
        Ok(outcome) if !outcome.execution.is_clean() => {
            tracing::warn!(
                %trigger,
                failed = outcome.execution.failure_count(),
                "recovery left effects unapplied; retrying at the next health check"
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(%trigger, error = %e, "recovery failed"),
    }
}
