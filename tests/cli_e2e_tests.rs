//! End-to-end tests for the pomodoro session host binary.
//!
//! These tests run the compiled binary and verify:
//! - Smoke startup and shutdown
//! - Version and help output
//! - Argument validation

use assert_cmd::Command;
use predicates::prelude::*;

fn host() -> Command {
    Command::cargo_bin("pomodoro-session").unwrap()
}

#[test]
fn test_smoke_succeeds() {
    host()
        .arg("smoke")
        .assert()
        .success()
        .stdout(predicate::str::contains("smoke OK"));
}

#[test]
fn test_smoke_verbose_logs_shutdown() {
    host()
        .args(["--verbose", "smoke"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::contains("session controller shut down"));
}

#[test]
fn test_version() {
    host()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_subcommands() {
    host()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("smoke"));
}

#[test]
fn test_run_rejects_zero_pomodoro() {
    host()
        .args(["run", "--pomodoro", "0"])
        .assert()
        .failure();
}

#[test]
fn test_run_rejects_long_break() {
    host()
        .args(["run", "--break-time", "61"])
        .assert()
        .failure();
}

#[test]
fn test_run_rejects_unknown_start_kind() {
    host()
        .args(["run", "--start", "nap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nap"));
}

#[test]
fn test_unknown_subcommand_fails() {
    host().arg("pause").assert().failure();
}
