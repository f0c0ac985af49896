use clap::{Args, ValueEnum};
use eyerefresh_core::{now_ms, Dispatcher, RecoveryTrigger};

use super::{load_config, open_db, print_json, CliResult};
use crate::terminal::TerminalNotifier;

#[derive(Clone, Copy, ValueEnum)]
pub enum Reason {
    /// Process start or UI attach
    AppStart,
    /// Device boot (all wake-ups were lost)
    Boot,
    /// Periodic backstop
    HealthCheck,
}

impl From<Reason> for RecoveryTrigger {
    fn from(reason: Reason) -> Self {
        match reason {
            Reason::AppStart => RecoveryTrigger::AppStart,
            Reason::Boot => RecoveryTrigger::Boot,
            Reason::HealthCheck => RecoveryTrigger::HealthCheck,
        }
    }
}

#[derive(Args)]
pub struct RecoverArgs {
    /// Why recovery is running
    #[arg(long, value_enum, default_value = "app-start")]
    reason: Reason,
}

pub fn run(args: RecoverArgs) -> CliResult {
    let db = open_db()?;
    let config = load_config();
    let notifier = TerminalNotifier::new(&db);
    let mut dispatcher = Dispatcher::new(&db, &db, &notifier);
    let outcome = dispatcher.recover(args.reason.into(), &config.timing, now_ms())?;
    print_json(&outcome)
}
