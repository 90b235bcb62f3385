//! Corruption recovery tests for liftlog.
//!
//! These tests verify the system can handle:
//! - Corrupted state files
//! - Corrupted WAL lines
//! - Corrupted CSV rows

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("liftlog"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_state_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("wal")).unwrap();
    let state_path = data_dir.join("wal/state.json");
    fs::write(&state_path, "{ invalid json }}}}").expect("Failed to write corrupted state");

    // Falls back to an empty state and starts a fresh session
    cli()
        .args(["log", "squat 100 5"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sets this session: 1"));

    let contents = fs::read_to_string(&state_path).unwrap();
    assert!(contents.contains("Squat"));
}

#[test]
fn test_corrupted_wal_lines_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args(["log", "dips 45 10"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();
    cli()
        .arg("end")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let wal_path = data_dir.join("wal/sessions.wal");
    let mut file = fs::OpenOptions::new().append(true).open(&wal_path).unwrap();
    writeln!(file, "{{ invalid json }}").unwrap();
    write!(file, "{{\"id\": \"partial").unwrap();
    drop(file);

    cli()
        .args(["stats", "dips"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total sets:   1"));

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 1 sessions"));
}

#[test]
fn test_corrupted_csv_rows_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args(["log", "shrugs 225 12"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();
    cli()
        .arg("end")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();
    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let csv_path = data_dir.join("sessions.csv");
    let mut file = fs::OpenOptions::new().append(true).open(&csv_path).unwrap();
    writeln!(file, "garbage,row").unwrap();
    drop(file);

    cli()
        .args(["stats", "shrugs"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Max weight:   225 lbs"));
}
