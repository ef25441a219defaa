//! Integration tests for the glyco binary.
//!
//! These tests verify end-to-end behavior including:
//! - The day view over a JSON Lines events file
//! - Classification rewriting the input buffer
//! - Weekly grids and CSV export
//! - Token persistence

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("glyco"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn write_morning(dir: &Path) {
    let events_dir = dir.join("data/events");
    fs::create_dir_all(&events_dir).unwrap();
    fs::write(
        events_dir.join("2024-05-01.jsonl"),
        concat!(
            r#"{"kind":"glucose_reading","text":"77","at":"2024-05-01T06:12:00.000Z"}"#,
            "\n",
            r#"{"kind":"food","text":"lunch","at":"2024-05-01T06:05:00.000Z"}"#,
            "\n",
            r#"{"kind":"glucose_reading","text":"70","at":"2024-05-01T05:57:00.000Z"}"#,
            "\n",
            r#"{"kind":"glucose_reading","text":"75","at":"2024-05-01T06:20:00.000Z"}"#,
            "\n",
        ),
    )
    .unwrap();
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily glucose and body-stat viewer"));
}

#[test]
fn test_day_aggregates_morning_readings() {
    let temp_dir = setup_test_dir();
    write_morning(temp_dir.path());

    cli(temp_dir.path())
        .args(["day", "--date", "2024-05-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("05:57    74.0  (3 samples)"))
        .stdout(predicate::str::contains("food: lunch @ 74.0"))
        .stdout(predicate::str::contains("Stable"))
        .stdout(predicate::str::contains("Readings: 3"));
}

#[test]
fn test_day_without_aggregation() {
    let temp_dir = setup_test_dir();
    write_morning(temp_dir.path());

    cli(temp_dir.path())
        .args(["day", "--date", "2024-05-01", "--threshold", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("05:57    70.0  (1 samples)"))
        .stdout(predicate::str::contains("06:12    77.0  (1 samples)"))
        .stdout(predicate::str::contains("06:20    75.0  (1 samples)"));
}

#[test]
fn test_day_with_no_events() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["day", "--date", "2024-05-09"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No data for this day"));
}

#[test]
fn test_day_rejects_bad_date() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["day", "--date", "05/01/2024"])
        .assert()
        .failure();
}

#[test]
fn test_day_csv_export() {
    let temp_dir = setup_test_dir();
    write_morning(temp_dir.path());
    let csv_path = temp_dir.path().join("out/day.csv");

    cli(temp_dir.path())
        .args(["day", "--date", "2024-05-01", "--csv"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 rows"));

    let content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines[0], "at,kind,value,samples,text");
    assert!(lines[1].starts_with("2024-05-01T05:57:00,glucose,74"));
    assert!(lines[2].contains("lunch"));
}

#[test]
fn test_classify_saves_matched_and_keeps_unmatched() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("entries.txt");
    fs::write(&input, "Peso (kg)\n72.4\nen ayunas\n\nZapatos\n42\n").unwrap();

    cli(temp_dir.path())
        .arg("classify")
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Peso: 72.4 kg"))
        .stdout(predicate::str::contains("Classified 1 entries, 1 unmatched"));

    assert_eq!(fs::read_to_string(&input).unwrap(), "Zapatos\n42");

    let records = fs::read_to_string(temp_dir.path().join("data/body_stats.jsonl"))
        .expect("Failed to read body stats");
    let lines: Vec<_> = records.lines().collect();
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["type"], "Peso");
    assert_eq!(record["value"], "72.4");
    assert_eq!(record["comment"], "en ayunas");
}

#[test]
fn test_classify_dry_run_changes_nothing() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("entries.txt");
    let original = "Grasa corporal\n21.3\n";
    fs::write(&input, original).unwrap();

    cli(temp_dir.path())
        .arg("classify")
        .arg("--input")
        .arg(&input)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(fs::read_to_string(&input).unwrap(), original);
    assert!(!temp_dir.path().join("data/body_stats.jsonl").exists());
}

#[test]
fn test_week_grid_orders_priority_types() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    // 2024-05-01T07:00Z and 2024-05-02T07:00Z, plus one outside the week
    fs::write(
        data_dir.join("body_stats.jsonl"),
        concat!(
            r#"{"type":"IMC","value":"23.1","comment":"","epoch":1714633200000}"#,
            "\n",
            r#"{"type":"Peso","value":"72.4","comment":"","epoch":1714546800000}"#,
            "\n",
            r#"{"type":"Peso","value":"80.0","comment":"","epoch":1715238000000}"#,
            "\n",
        ),
    )
    .unwrap();

    let output = cli(temp_dir.path())
        .args(["week", "--start", "2024-05-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("72.4"))
        .stdout(predicate::str::contains("23.1"))
        .stdout(predicate::str::contains("80.0").not())
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let peso = stdout.find("Peso").unwrap();
    let imc = stdout.find("IMC").unwrap();
    assert!(peso < imc, "Peso should be listed before IMC");
}

#[test]
fn test_week_csv_export() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("body_stats.jsonl"),
        r#"{"type":"Peso","value":"72.4","comment":"","epoch":1714546800000}"#,
    )
    .unwrap();
    let csv_path = temp_dir.path().join("week.csv");

    cli(temp_dir.path())
        .args(["week", "--start", "2024-05-01", "--csv"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 7 cells"));

    let content = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 8);
    assert!(content.contains("Peso,2024-05-01,72.4"));
}

#[test]
fn test_token_lifecycle() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["token", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No token stored"));

    cli(temp_dir.path())
        .args(["token", "set", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token saved"));

    assert!(temp_dir.path().join("data/token.json").exists());

    cli(temp_dir.path())
        .args(["token", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token stored"));

    cli(temp_dir.path())
        .args(["token", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token removed"));

    assert!(!temp_dir.path().join("data/token.json").exists());
}

#[test]
fn test_corrupt_token_file_is_not_logged_in() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("token.json"), "{ invalid json }}}}").unwrap();

    cli(temp_dir.path())
        .args(["token", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No token stored"));
}
