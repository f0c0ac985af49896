use chrono::{Local, NaiveDate};
use clap::Subcommand;
use eyerefresh_core::{CompletedSession, Range, RangeKind, Timestamp};
use serde::Serialize;

use super::{open_db, print_json, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Completed refreshes in a calendar window (local time)
    Sessions {
        /// day, week, month or year
        #[arg(long, default_value = "day")]
        range: RangeKind,
        /// Any date inside the window, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Most recent raw events, newest first
    Events {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Serialize)]
struct SessionsReport {
    kind: RangeKind,
    range: String,
    start: Timestamp,
    end: Timestamp,
    previous: Option<String>,
    next: Option<String>,
    count: usize,
    total_duration_ms: u64,
    sessions: Vec<CompletedSession>,
}

pub fn run(action: HistoryAction) -> CliResult {
    let db = open_db()?;
    match action {
        HistoryAction::Sessions { range, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let window = Range::containing(range, date);
            let (start, end) = window
                .bounds(&Local)
                .ok_or_else(|| format!("{window} cannot be placed on the local calendar"))?;

            let sessions = db.sessions_started_between(start, end)?;
            print_json(&SessionsReport {
                kind: window.kind(),
                range: window.to_string(),
                start,
                end,
                previous: window.previous().map(|r| r.to_string()),
                next: window.next().map(|r| r.to_string()),
                count: sessions.len(),
                total_duration_ms: sessions.iter().map(|s| s.duration_ms).sum(),
                sessions,
            })
        }
        HistoryAction::Events { limit } => print_json(&db.recent_events(limit)?),
    }
}
