//! End-to-end tests for the callsweep binary
#![allow(deprecated)] // Command::cargo_bin is deprecated but still functional

mod utils;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use utils::{capture_path, FIXTURE_CSV, FIXTURE_NOW};

#[test]
fn test_cli_writes_dated_csv_report() {
    let out = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("callsweep").unwrap();
    cmd.arg("--now")
        .arg(FIXTURE_NOW)
        .arg("--output-dir")
        .arg(out.path())
        .arg(capture_path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Report ready: 4 rows, 5 missed calls"))
        .stderr(predicate::str::contains("missed_calls_2026-10-19.csv"));

    let csv = fs::read_to_string(out.path().join("missed_calls_2026-10-19.csv")).unwrap();
    assert_eq!(csv, FIXTURE_CSV);
}

#[test]
fn test_cli_json_format_on_stdout() {
    let out = TempDir::new().unwrap();

    let output = Command::cargo_bin("callsweep")
        .unwrap()
        .arg("--now")
        .arg(FIXTURE_NOW)
        .arg("--format")
        .arg("json")
        .arg("--output-dir")
        .arg(out.path())
        .arg(capture_path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total_calls"], 5);
    assert_eq!(value["rows"].as_array().unwrap().len(), 4);
    assert_eq!(value["rows"][0]["phone_number"], "(555)123-4567");

    // JSON mode writes no CSV file
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_cli_chronological_flag() {
    let out = TempDir::new().unwrap();

    Command::cargo_bin("callsweep")
        .unwrap()
        .arg("--now")
        .arg(FIXTURE_NOW)
        .arg("--chronological")
        .arg("-o")
        .arg(out.path())
        .arg(capture_path())
        .assert()
        .success();

    let csv = fs::read_to_string(out.path().join("missed_calls_2026-10-19.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[3], "10/18/2026 11:59 pm,(555)444-5555,1");
    assert_eq!(lines[4], "10/18/2026 9:05 am,(555)222-3333,1");
}

#[test]
fn test_cli_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("callsweep.toml");
    fs::write(&config, "ordering = \"chronological\"\nstop_threshold = 1\n").unwrap();

    Command::cargo_bin("callsweep")
        .unwrap()
        .arg("--now")
        .arg(FIXTURE_NOW)
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(dir.path())
        .arg(capture_path())
        .assert()
        .success()
        .stderr(predicate::str::contains("rounds: 4"));
}

#[test]
fn test_cli_empty_report_is_informational() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("old.json");
    fs::write(
        &capture,
        r#"{ "frames": [ { "scroll_top": 0, "entries": [
            { "identity": 0, "sender": "5551234567", "timestamp": "3/1/2024 10:00 AM", "content": "Missed call" }
        ] } ] }"#,
    )
    .unwrap();

    Command::cargo_bin("callsweep")
        .unwrap()
        .arg("--now")
        .arg(FIXTURE_NOW)
        .arg("-o")
        .arg(dir.path())
        .arg(&capture)
        .assert()
        .success()
        .stderr(predicate::str::contains("No missed calls found"));

    assert!(!dir.path().join("missed_calls_2026-10-19.csv").exists());
}

#[test]
fn test_cli_empty_capture_fails() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("empty.json");
    fs::write(&capture, r#"{ "frames": [] }"#).unwrap();

    Command::cargo_bin("callsweep")
        .unwrap()
        .arg(&capture)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scrollable call list"));
}

#[test]
fn test_cli_missing_capture_fails() {
    Command::cargo_bin("callsweep")
        .unwrap()
        .arg("/nonexistent/capture.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read capture"));
}

#[test]
fn test_cli_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "stop_threshold = 0\n").unwrap();

    Command::cargo_bin("callsweep")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .arg(capture_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("stop_threshold"));
}

#[test]
fn test_cli_debug_routes_status_through_tracing() {
    let out = TempDir::new().unwrap();

    Command::cargo_bin("callsweep")
        .unwrap()
        .arg("--debug")
        .arg("--now")
        .arg(FIXTURE_NOW)
        .arg("-o")
        .arg(out.path())
        .arg(capture_path())
        .assert()
        .success()
        .stderr(predicate::str::contains("callsweep::status"))
        .stderr(predicate::str::contains("Report ready: 4 rows, 5 missed calls"));
}

#[test]
fn test_cli_sparse_identities_summarized_as_runs() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("sparse.json");
    fs::write(
        &capture,
        r#"{ "frames": [ { "scroll_top": 0, "entries": [
            { "identity": 0, "sender": "5551234567", "timestamp": "2:15 PM", "content": "Missed call" },
            { "identity": 60000000, "sender": "5559876543", "timestamp": "1:05 PM", "content": "Missed call" }
        ] } ] }"#,
    )
    .unwrap();

    Command::cargo_bin("callsweep")
        .unwrap()
        .arg("--now")
        .arg(FIXTURE_NOW)
        .arg("-o")
        .arg(dir.path())
        .arg(&capture)
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "59999999 entries were never observed: 1-59999999",
        ));

    assert!(dir.path().join("missed_calls_2026-10-19.csv").exists());
}
