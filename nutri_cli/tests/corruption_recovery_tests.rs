//! Corruption recovery tests for nwatch.
//!
//! These tests verify the system can handle:
//! - Corrupted journal lines
//! - Partial (torn) writes at the end of a journal, including torn UTF-8
//! - Missing files and directories
//! - Invalid configuration

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("nwatch"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn nwatch(data_dir: &Path) -> Command {
    let mut cmd = cli();
    cmd.env("XDG_CONFIG_HOME", data_dir.join("xdg-config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn journal_path(data_dir: &Path) -> PathBuf {
    data_dir.join("profiles/default/intake.jsonl")
}

fn log_water(data_dir: &Path, date: &str) {
    nwatch(data_dir)
        .args(["log", "--name", "water", "--date", date])
        .args(["--nutrient", "water=1L"])
        .assert()
        .success();
}

#[test]
fn test_fully_corrupted_journal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let journal = journal_path(data_dir);
    fs::create_dir_all(journal.parent().unwrap()).unwrap();
    fs::write(&journal, "{ invalid json }\n{ more invalid }").expect("Failed to write journal");

    // Unreadable lines are skipped, leaving an empty history
    nwatch(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No intake logged"));

    nwatch(data_dir).arg("analyze").assert().success();

    // New entries can still be logged after the garbage
    log_water(data_dir, "2025-10-01");
    nwatch(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-10-01"));
}

#[test]
fn test_torn_write_at_end_of_journal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_water(data_dir, "2025-10-01");
    log_water(data_dir, "2025-10-02");

    // Simulate a crash halfway through an append
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(journal_path(data_dir))
        .unwrap();
    file.write_all(br#"{"op":"add_food","day":"2025-10-03","entry":{"id":"#)
        .unwrap();
    drop(file);

    let output = nwatch(data_dir).arg("show").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2025-10-01"));
    assert!(stdout.contains("2025-10-02"));
    assert!(!stdout.contains("2025-10-03"));

    // The next append starts on a fresh line after the torn one
    log_water(data_dir, "2025-10-04");
    nwatch(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-10-04"));
}

#[test]
fn test_torn_write_inside_multibyte_character() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    nwatch(data_dir)
        .args(["log", "--name", "salmon", "--date", "2025-10-01"])
        .args(["--nutrient", "vitamin_d=10µg"])
        .assert()
        .success();

    // The crash cut 'µ' (0xC2 0xB5) after its first byte
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(journal_path(data_dir))
        .unwrap();
    file.write_all(b"{\"op\":\"add_food\",\"day\":\"2025-10-02\",\"unit\":\"\xC2")
        .unwrap();
    drop(file);

    nwatch(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-10-01"))
        .stdout(predicate::str::contains("2025-10-02").not());

    log_water(data_dir, "2025-10-03");
    nwatch(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-10-03"))
        .stdout(predicate::str::contains("2025-10-01"));
}

#[test]
fn test_unknown_events_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_water(data_dir, "2025-10-01");

    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(journal_path(data_dir))
        .unwrap();
    writeln!(file, r#"{{"op":"rename_food","id":"x"}}"#).unwrap();
    writeln!(file).unwrap();
    drop(file);

    nwatch(data_dir)
        .args(["entries", "--date", "2025-10-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("water"));
}

#[test]
fn test_missing_data_dir_is_created() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("does/not/exist/yet");

    nwatch(&data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No intake logged"));

    // Reading does not create anything
    assert!(!journal_path(&data_dir).exists());

    log_water(&data_dir, "2025-10-01");
    assert!(journal_path(&data_dir).exists());
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[store\nlock_timeout_ms = ").unwrap();

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Toml"));
}

#[test]
fn test_missing_config_file_is_reported() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--config")
        .arg(temp_dir.path().join("absent.toml"))
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Io"));
}
