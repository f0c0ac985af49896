use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "eyerefresh", version, about = "Eye refresh reminder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the reminder loop
    Reminder {
        #[command(subcommand)]
        action: commands::reminder::ReminderAction,
    },
    /// Reconcile stored state with the clock and re-arm wake-ups
    Recover(commands::recover::RecoverArgs),
    /// Run the wake-up loop in the foreground
    Daemon(commands::daemon::DaemonArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Completed refreshes and the raw event log
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Erase the stored state, wake-ups, notification and event log
    Reset,
}

fn init_logging() {
    // stdout carries JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("EYEREFRESH_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Reminder { action } => commands::reminder::run(action),
        Commands::Recover(args) => commands::recover::run(args),
        Commands::Daemon(args) => commands::daemon::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Reset => commands::reset::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
