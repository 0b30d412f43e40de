//! Integration tests for the sympto binary.
//!
//! These tests verify end-to-end behavior including:
//! - Recording days and managing cycles
//! - Analysis output (report and JSON)
//! - CSV chart export

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("sympto"))
}

/// Write a 24-day charted cycle starting 2024-03-01: bleeding on days 1-4,
/// fertile mucus on days 9-11, temperatures rising on day 19.
fn write_charted_store(data_dir: &Path) {
    let entries: Vec<Value> = (0..24)
        .map(|i| {
            let date = format!("2024-03-{:02}", i + 1);
            let temp = if i < 18 { 36.3 } else { 36.6 };
            if i < 4 {
                json!({ "date": date, "temp": temp, "bleeding": "medium" })
            } else if (8..=10).contains(&i) {
                json!({
                    "date": date,
                    "temp": temp,
                    "mucusSensation": "slippery",
                    "mucusAspect": "stretchy"
                })
            } else {
                json!({
                    "date": date,
                    "temp": temp,
                    "mucusSensation": "dry",
                    "mucusAspect": "nothing"
                })
            }
        })
        .collect();

    let store = json!({
        "cycles": [{ "id": 1, "startDate": "2024-03-01", "entries": entries }],
        "activeCycle": 0
    });
    fs::create_dir_all(data_dir).unwrap();
    fs::write(
        data_dir.join("cycles.json"),
        serde_json::to_string_pretty(&store).unwrap(),
    )
    .unwrap();
}

fn read_store(data_dir: &Path) -> Value {
    let contents = fs::read_to_string(data_dir.join("cycles.json")).expect("Failed to read store");
    serde_json::from_str(&contents).expect("Store is not valid JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Symptothermal cycle charting and analysis",
        ));
}

#[test]
fn test_analyze_json_reports_double_check() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    write_charted_store(&data_dir);

    let output = cli()
        .arg("analyze")
        .arg("--json")
        .arg("--data-dir")
        .arg(&data_dir)
        .output()
        .unwrap();
    assert!(output.status.success());

    let analysis: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(analysis["peakDayIndex"], 10);
    assert_eq!(analysis["coverLine"], 36.3);
    assert_eq!(analysis["highTempIndices"], json!([18, 19, 20]));
    assert_eq!(analysis["tempShiftConfirmedIndex"], 20);
    assert_eq!(analysis["bleedingDays"], json!([0, 1, 2, 3]));
    assert_eq!(analysis["postOvulatoryInfertileStartIndex"], 21);
}

#[test]
fn test_analyze_report_uses_cycle_days() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    write_charted_store(&data_dir);

    cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Peak day:         day 11 (2024-03-11)"))
        .stdout(predicate::str::contains("Coverline:        36.30 °C"))
        .stdout(predicate::str::contains("Infertile from:   day 22 (2024-03-22)"));
}

#[test]
fn test_record_creates_and_merges_entries() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args(["new-cycle", "--start-date", "2024-05-01", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Started cycle 2 on 2024-05-01"));

    cli()
        .args(["record", "--date", "2024-05-02", "--temp", "36.45", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded 2024-05-02 in cycle 2"));

    // A second record for the same day merges into the existing entry
    cli()
        .args(["record", "--date", "2024-05-02", "--sensation", "damp", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success();

    let store = read_store(&data_dir);
    let cycles = store["cycles"].as_array().unwrap();
    assert_eq!(cycles.len(), 2);
    assert_eq!(store["activeCycle"], 1);

    let entries = cycles[1]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["temp"], 36.45);
    assert_eq!(entries[0]["mucusSensation"], "damp");
}

#[test]
fn test_bleeding_clears_mucus() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    write_charted_store(&data_dir);

    cli()
        .args(["record", "--date", "2024-03-05", "--bleeding", "spotting", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success();

    let store = read_store(&data_dir);
    let entry = &store["cycles"][0]["entries"][4];
    assert_eq!(entry["bleeding"], "spotting");
    assert_eq!(entry["mucusSensation"], Value::Null);
    assert_eq!(entry["temp"], 36.3);
}

#[test]
fn test_disturbance_excludes_temperature() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args([
            "record",
            "--date",
            "2024-05-03",
            "--temp",
            "36.9",
            "--disturbance",
            "alcohol",
            "--data-dir",
        ])
        .arg(&data_dir)
        .assert()
        .success();

    let store = read_store(&data_dir);
    let entry = &store["cycles"][0]["entries"][0];
    assert_eq!(entry["excludeTemp"], true);
    assert_eq!(entry["disturbances"], json!(["alcohol"]));

    cli()
        .args(["record", "--date", "2024-05-03", "--include-temp", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success();

    let store = read_store(&data_dir);
    assert_eq!(store["cycles"][0]["entries"][0]["excludeTemp"], false);
}

#[test]
fn test_unknown_observation_is_a_usage_error() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args(["record", "--date", "2024-05-02", "--sensation", "sticky", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown sensation 'sticky'"));

    assert!(!data_dir.join("cycles.json").exists());
}

#[test]
fn test_observations_accept_store_vocabulary() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args([
            "record",
            "--date",
            "2024-05-02",
            "--sensation",
            "Glissante",
            "--aspect",
            "egg-white",
            "--disturbance",
            "short_sleep",
            "--disturbance",
            "late",
            "--data-dir",
        ])
        .arg(&data_dir)
        .assert()
        .success();

    let store = read_store(&data_dir);
    let entry = &store["cycles"][0]["entries"][0];
    assert_eq!(entry["mucusSensation"], "slippery");
    assert_eq!(entry["mucusAspect"], "egg_white");
    assert_eq!(entry["disturbances"], json!(["short_sleep", "late_measurement"]));

    cli()
        .args(["record", "--date", "2024-05-02", "--bleeding", "gushing", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown bleeding 'gushing'"));
}

#[test]
fn test_include_temp_conflicts_with_disturbance() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args([
            "record",
            "--date",
            "2024-05-03",
            "--temp",
            "36.9",
            "--include-temp",
            "--disturbance",
            "alcohol",
            "--data-dir",
        ])
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));

    assert!(!data_dir.join("cycles.json").exists());
}

#[test]
fn test_implausible_temperature_is_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args(["record", "--date", "2024-05-03", "--temp", "98.6", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .failure();

    assert!(!data_dir.join("cycles.json").exists());
}

#[test]
fn test_delete_entry() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    write_charted_store(&data_dir);

    cli()
        .args(["delete-entry", "--date", "2024-03-24", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2024-03-24"));

    cli()
        .args(["delete-entry", "--date", "2024-03-24", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No entry recorded"));

    let store = read_store(&data_dir);
    assert_eq!(store["cycles"][0]["entries"].as_array().unwrap().len(), 23);
}

#[test]
fn test_select_and_delete_cycles() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    write_charted_store(&data_dir);

    cli()
        .args(["new-cycle", "--start-date", "2024-03-25", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success();

    cli()
        .arg("cycles")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("*  2. cycle 2"))
        .stdout(predicate::str::contains("24 days recorded"));

    cli()
        .args(["select", "0", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .failure();

    cli()
        .args(["select", "1", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Active cycle is now 1"));

    cli()
        .args(["delete-cycle", "2", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted cycle 2"));

    let store = read_store(&data_dir);
    assert_eq!(store["cycles"].as_array().unwrap().len(), 1);
    assert_eq!(store["activeCycle"], 0);
}

#[test]
fn test_edit_cycle_moves_cycle_days() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    write_charted_store(&data_dir);

    cli()
        .args(["edit-cycle", "1", "--id", "5", "--start-date", "2024-02-28", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cycle 5 starts 2024-02-28"));

    // Same entries, so the peak is still 2024-03-11, now on cycle day 13
    cli()
        .args(["analyze", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Peak day:         day 13 (2024-03-11)"));

    cli()
        .args(["edit-cycle", "3", "--id", "9", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .failure();
}

#[test]
fn test_export_chart_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    write_charted_store(&data_dir);
    let csv_path = temp_dir.path().join("exports").join("chart.csv");

    cli()
        .arg("export")
        .arg("--output")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 24 days"));

    let contents = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 25);
    assert_eq!(
        lines[0],
        "index,cycle_day,date,temp,temp_usable,mucus_code,bleeding,marker"
    );
    assert!(lines[11].ends_with(",peak"));
    assert!(lines[21].ends_with(",high;shift"));
    assert!(lines[22].ends_with(",infertile"));
}

#[test]
fn test_analyze_empty_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args(["analyze", "--json", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));

    // Reading never creates the store
    assert!(!data_dir.join("cycles.json").exists());
}
