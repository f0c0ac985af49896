//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory via
//! `EYEREFRESH_HOME` and checks stdout.

use std::path::Path;
use std::process::Command;

use eyerefresh_core::{AppState, Database, StateStore};

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_eyerefresh"))
        .args(args)
        .env("EYEREFRESH_HOME", home)
        .env("EYEREFRESH_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("{args:?} printed non-JSON ({e}): {stdout}"))
}

#[test]
fn test_fresh_status_is_paused() {
    let home = tempfile::tempdir().unwrap();
    let status = run_json(home.path(), &["reminder", "status"]);
    assert_eq!(status["state"]["type"], "Paused");
    assert!(status["notification"].is_null());
    assert_eq!(status["wakeups"].as_array().unwrap().len(), 0);
}

#[test]
fn test_turning_on_schedules_next_reminder() {
    let home = tempfile::tempdir().unwrap();
    let outcome = run_json(home.path(), &["reminder", "on"]);
    assert_eq!(outcome["committed"], true);
    assert_eq!(outcome["to"]["type"], "TimeLeftForNextRefresh");

    let status = run_json(home.path(), &["reminder", "status"]);
    let wakeups = status["wakeups"].as_array().unwrap();
    assert_eq!(wakeups.len(), 1);
    assert_eq!(wakeups[0]["timer"], "NextReminder");
    assert_eq!(wakeups[0]["fire_at"], status["state"]["scheduled_at"]);
}

#[test]
fn test_ignored_event_is_not_committed() {
    let home = tempfile::tempdir().unwrap();
    let outcome = run_json(home.path(), &["reminder", "done"]);
    assert_eq!(outcome["committed"], false);
    assert_eq!(outcome["to"]["type"], "Paused");
}

#[test]
fn test_pause_clears_wakeups() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["reminder", "on"]);
    let outcome = run_json(home.path(), &["reminder", "pause"]);
    assert_eq!(outcome["to"]["type"], "Paused");

    let status = run_json(home.path(), &["reminder", "status"]);
    assert_eq!(status["wakeups"].as_array().unwrap().len(), 0);
}

#[test]
fn test_respond_without_notification_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["reminder", "respond", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no notification"));
}

/// Store a reminder that came due long ago, as if no daemon had been running.
fn store_overdue_reminder(home: &Path) {
    let db = Database::open_at(home.join("eyerefresh.db")).unwrap();
    db.put(AppState::TimeLeftForNextRefresh { scheduled_at: 1_000 }, 500).unwrap();
}

#[test]
fn test_status_catches_up_on_overdue_reminder() {
    let home = tempfile::tempdir().unwrap();
    store_overdue_reminder(home.path());

    let status = run_json(home.path(), &["reminder", "status"]);
    assert_eq!(status["state"]["type"], "RefreshCanStart");
    assert_eq!(status["notification"]["kind"], "RefreshReminder");
}

#[test]
fn test_begin_acts_on_overdue_reminder() {
    let home = tempfile::tempdir().unwrap();
    store_overdue_reminder(home.path());

    let outcome = run_json(home.path(), &["reminder", "begin"]);
    assert_eq!(outcome["committed"], true);
    assert_eq!(outcome["from"]["type"], "RefreshCanStart");
    assert_eq!(outcome["to"]["type"], "RefreshHappening");
}

#[test]
fn test_recover_on_fresh_install_is_idle() {
    let home = tempfile::tempdir().unwrap();
    let outcome = run_json(home.path(), &["recover", "--reason", "boot"]);
    assert_eq!(outcome["trigger"], "Boot");
    assert_eq!(outcome["action"]["type"], "Idle");
}

#[test]
fn test_recover_rearms_after_boot() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["reminder", "on"]);
    let outcome = run_json(home.path(), &["recover", "--reason", "boot"]);
    assert_eq!(outcome["action"]["type"], "Rearmed");
    assert_eq!(outcome["action"]["timer"], "NextReminder");
}

#[test]
fn test_config_get_set_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "timing.break_duration_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "20000");

    let (code, _, _) =
        run_cli(home.path(), &["config", "set", "timing.break_duration_ms", "30000"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "timing.break_duration_ms"]);
    assert_eq!(stdout.trim(), "30000");
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "set", "timing.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_list_is_json() {
    let home = tempfile::tempdir().unwrap();
    let config = run_json(home.path(), &["config", "list"]);
    assert_eq!(config["timing"]["reminder_interval_ms"], 1_200_000);
    assert_eq!(config["daemon"]["poll_interval_ms"], 1_000);
}

#[test]
fn test_config_list_flat_prints_dot_paths() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "list", "--flat"]);
    assert_eq!(code, 0);
    assert!(stdout.lines().any(|l| l == "timing.break_duration_ms = 20000"));
    assert!(stdout.lines().any(|l| l == "daemon.health_check_interval_ms = none"));
}

#[test]
fn test_config_set_accepts_zero_snooze() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) =
        run_cli(home.path(), &["config", "set", "timing.snooze_duration_ms", "0"]);
    assert_eq!(code, 0, "{stderr}");
}

#[test]
fn test_history_events_lists_committed_events() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["reminder", "on"]);
    run_json(home.path(), &["reminder", "pause"]);
    let events = run_json(home.path(), &["history", "events", "--limit", "5"]);
    let names: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["SchedulingPaused", "SchedulingTurnedOn"]);
}

#[test]
fn test_history_sessions_for_a_past_week() {
    let home = tempfile::tempdir().unwrap();
    let report = run_json(
        home.path(),
        &["history", "sessions", "--range", "week", "--date", "2024-03-07"],
    );
    assert_eq!(report["kind"], "week");
    assert_eq!(report["range"], "2024-W10");
    assert_eq!(report["previous"], "2024-W09");
    assert_eq!(report["count"], 0);
}

#[test]
fn test_history_sessions_rejects_unknown_range() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["history", "sessions", "--range", "fortnight"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown range"));
}

#[test]
fn test_daemon_once_exits() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["daemon", "--once"]);
    assert_eq!(code, 0);
}

#[test]
fn test_unusable_data_dir_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let not_a_dir = home.path().join("occupied");
    std::fs::write(&not_a_dir, "").unwrap();

    let (code, _, stderr) = run_cli(&not_a_dir, &["reminder", "status"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Data directory unavailable"), "{stderr}");
}

#[test]
fn test_reset_clears_state() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["reminder", "on"]);
    let (code, _, _) = run_cli(home.path(), &["reset"]);
    assert_eq!(code, 0);
    let status = run_json(home.path(), &["reminder", "status"]);
    assert_eq!(status["state"]["type"], "Paused");
    assert!(status["written_at"].is_null());
}
