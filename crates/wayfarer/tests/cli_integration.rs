//! CLI integration tests for the Wayfarer command-line interface.
//!
//! These tests do not require a running server: they cover argument
//! parsing, offline replay of captured streams, and the saved-session store.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the wayfarer binary, isolated from the user's config.
fn wayfarer(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wayfarer").unwrap();
    cmd.env("WAYFARER_CONFIG_DIR", home.path().join("config"))
        .env_remove("WAYFARER_SERVER_URL")
        .current_dir(home.path());
    cmd
}

/// Temp home whose config points session storage inside it.
fn home_with_storage() -> TempDir {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "[storage]\ndir = {:?}\n",
            home.path().join("sessions").display().to_string()
        ),
    )
    .unwrap();
    home
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    wayfarer(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wayfarer"))
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("last"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_displays() {
    let home = TempDir::new().unwrap();
    wayfarer(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wayfarer"));
}

#[test]
fn test_discover_requires_message() {
    let home = TempDir::new().unwrap();
    wayfarer(&home)
        .arg("discover")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<MESSAGE>"));
}

#[test]
fn test_discover_location_needs_both_coordinates() {
    let home = TempDir::new().unwrap();
    wayfarer(&home)
        .args(["discover", "coffee", "--lat", "38.7"])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_replay_renders_assembled_session() {
    let home = TempDir::new().unwrap();
    wayfarer(&home)
        .arg("replay")
        .arg(fixture("lisbon.sse"))
        .assert()
        .success()
        .stdout(predicate::str::contains("general in Lisbon"))
        .stdout(predicate::str::contains("Lisbon, Portugal"))
        .stdout(predicate::str::contains("Belém Tower [landmark]"))
        .stdout(predicate::str::contains("Alfama"))
        .stdout(predicate::str::contains("A day by the river"));
}

#[test]
fn test_replay_json_output() {
    let home = TempDir::new().unwrap();
    let output = wayfarer(&home)
        .args(["--json", "replay"])
        .arg(fixture("lisbon.sse"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let session: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(session["session_id"], "3f2b8c1a-6d4e-4f7a-9b0c-1d2e3f4a5b6c");
    assert_eq!(session["is_complete"], true);
    assert_eq!(session["data"]["domain"], "general");
    assert_eq!(
        session["data"]["general_city_data"]["description"],
        "Hills, trams {and} tiles"
    );
    assert_eq!(
        session["data"]["points_of_interest"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_replay_of_failed_stream_exits_nonzero() {
    let home = TempDir::new().unwrap();
    wayfarer(&home)
        .arg("replay")
        .arg(fixture("failed.sse"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("generator overloaded"));
}

#[test]
fn test_replay_missing_file() {
    let home = TempDir::new().unwrap();
    wayfarer(&home)
        .args(["replay", "does-not-exist.sse"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Saved sessions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_last_without_saved_session() {
    let home = home_with_storage();
    wayfarer(&home)
        .arg("last")
        .assert()
        .success()
        .stdout(predicate::str::contains("No completed session saved yet"));
}

#[test]
fn test_replay_save_then_last() {
    let home = home_with_storage();
    wayfarer(&home)
        .args(["replay", "--save"])
        .arg(fixture("lisbon.sse"))
        .assert()
        .success();

    assert!(home.path().join("sessions").join("completed_session.json").exists());

    wayfarer(&home)
        .arg("last")
        .assert()
        .success()
        .stdout(predicate::str::contains("Belém Tower"));

    wayfarer(&home)
        .args(["last", "--session", "3f2b8c1a-6d4e-4f7a-9b0c-1d2e3f4a5b6c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alfama"));

    wayfarer(&home).args(["last", "--clear"]).assert().success();
    wayfarer(&home)
        .arg("last")
        .assert()
        .success()
        .stdout(predicate::str::contains("No completed session saved yet"));
}

#[test]
fn test_last_unknown_session_fails() {
    let home = home_with_storage();
    wayfarer(&home)
        .args(["last", "--session", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session not found"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_reflects_server_flag() {
    let home = TempDir::new().unwrap();
    wayfarer(&home)
        .args(["--server", "https://api.example.com", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://api.example.com"))
        .stdout(predicate::str::contains("[rate_limit]"));
}

#[test]
fn test_config_which_lists_sources() {
    let home = home_with_storage();
    wayfarer(&home)
        .args(["config", "--which"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loaded"))
        .stdout(predicate::str::contains("wayfarer.toml"));
}
