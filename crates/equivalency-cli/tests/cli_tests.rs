//! End-to-end tests for the equivalency binary

use equivalency_core::{ColumnType, DataColumn, DataTable, ObjectGraph};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn write_orders(dir: &Path, name: &str, totals: &[i64]) -> PathBuf {
    let table = totals.iter().enumerate().fold(
        DataTable::new("Orders")
            .with_column(DataColumn::new("Id", ColumnType::Int))
            .with_column(DataColumn::new("Total", ColumnType::Int))
            .with_primary_key(["Id"]),
        |table, (id, total)| table.with_row(vec![id as i64, *total]),
    );
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&ObjectGraph::from(table)).unwrap()).unwrap();
    path
}

fn equivalency(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_equivalency"));
    command.current_dir(dir).env_remove("RUST_LOG");
    command
}

#[test]
fn test_equal_files_exit_successfully() {
    let dir = TempDir::new().unwrap();
    let subject = write_orders(dir.path(), "subject.json", &[100, 200]);
    let expectation = write_orders(dir.path(), "expected.json", &[100, 200]);

    let output = equivalency(dir.path())
        .arg("compare")
        .arg(&subject)
        .arg(&expectation)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("equivalent"));
}

#[test]
fn test_mismatches_exit_with_failure_and_write_report() {
    let dir = TempDir::new().unwrap();
    let subject = write_orders(dir.path(), "subject.json", &[100, 200]);
    let expectation = write_orders(dir.path(), "expected.json", &[100, 250]);
    let report_path = dir.path().join("report.json");

    let output = equivalency(dir.path())
        .arg("compare")
        .arg(&subject)
        .arg(&expectation)
        .arg("--output")
        .arg(&report_path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Rows[1].Total"));

    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["summary"]["total"], 1);
    assert_eq!(report["mismatches"][0]["code"], "VALUE_MISMATCH");
    assert_eq!(report["mismatches"][0]["expected"], "250");
}

#[test]
fn test_config_file_in_working_directory_is_picked_up() {
    let dir = TempDir::new().unwrap();
    let subject = write_orders(dir.path(), "subject.json", &[100, 200]);
    let expectation = write_orders(dir.path(), "expected.json", &[100, 250]);
    std::fs::write(
        dir.path().join("equivalency.toml"),
        "[defaults]\nexclude_columns = [\"Total\"]\n",
    )
    .unwrap();

    let status = equivalency(dir.path())
        .arg("compare")
        .arg(&subject)
        .arg(&expectation)
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn test_init_config_writes_defaults() {
    let dir = TempDir::new().unwrap();

    let status = equivalency(dir.path()).arg("init-config").status().unwrap();
    assert!(status.success());
    let written = std::fs::read_to_string(dir.path().join("equivalency.toml")).unwrap();
    assert!(written.contains("[defaults]"));

    let status = equivalency(dir.path()).arg("init-config").status().unwrap();
    assert!(!status.success());
}
