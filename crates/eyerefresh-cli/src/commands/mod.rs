pub mod config;
pub mod daemon;
pub mod history;
pub mod recover;
pub mod reminder;
pub mod reset;

use eyerefresh_core::{Config, Database};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_db() -> Result<Database, Box<dyn std::error::Error>> {
    Ok(Database::open()?)
}

/// Config is re-read for every command so edits take effect immediately.
pub fn load_config() -> Config {
    Config::load_or_default()
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
