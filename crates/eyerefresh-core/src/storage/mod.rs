mod config;
pub mod database;
mod event_log;
pub mod migrations;
mod notifications;
mod store;
mod wakeups;

pub use config::{Config, DaemonConfig};
pub use database::Database;
pub use event_log::LoggedEvent;
pub use notifications::ActiveNotification;
pub use store::{Snapshot, StateStore};
pub use wakeups::PendingWakeup;

use std::path::PathBuf;

/// Returns the eyerefresh data directory, creating it if needed.
///
/// `EYEREFRESH_HOME` overrides the location outright. Otherwise this is
/// `~/.config/eyerefresh[-dev]/`, with the `-dev` suffix when
/// `EYEREFRESH_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("EYEREFRESH_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("EYEREFRESH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("eyerefresh-dev")
            } else {
                base_dir.join("eyerefresh")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
