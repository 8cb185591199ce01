//! Integration tests for the `ucnet` binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SINGLE_UNIT: &str = r#"
n_units = 1
n_periods = 3
demand = [5.0, 0.0, 5.0]
p_min = [0.0]
p_max = [10.0]
c0 = [200.0]
c1 = [1.0]
c2 = [0.0]
min_up_time = [2]
min_down_time = [2]
startup_cost = [100.0]
initial_status = "0"
"#;

fn write_problem(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_help() {
    let mut cmd = cargo_bin_cmd!("ucnet");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unit commitment"))
        .stdout(predicate::str::contains("solve"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_solve_help_lists_overrides() {
    let mut cmd = cargo_bin_cmd!("ucnet");
    cmd.args(["solve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--threads"))
        .stdout(predicate::str::contains("--horizon"))
        .stdout(predicate::str::contains("--backend"));
}

#[test]
fn test_validate_reports_sizes() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "single.toml", SINGLE_UNIT);
    let mut cmd = cargo_bin_cmd!("ucnet");
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 units, 3 periods, 2 combinations"));
}

#[test]
fn test_validate_rejects_inconsistent_columns() {
    let dir = TempDir::new().unwrap();
    let text = SINGLE_UNIT.replace("p_max = [10.0]", "p_max = [10.0, 20.0]");
    let path = write_problem(&dir, "bad.toml", &text);
    let mut cmd = cargo_bin_cmd!("ucnet");
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("p_max"));
}

#[test]
fn test_solve_table() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "single.toml", SINGLE_UNIT);
    let mut cmd = cargo_bin_cmd!("ucnet");
    cmd.args(["--log-level", "warn", "solve"])
        .arg(&path)
        .args(["--threads", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: optimal"))
        .stdout(predicate::str::contains("Objective: 610.0000"));
}

#[test]
fn test_solve_json_with_full_horizon() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "single.toml", SINGLE_UNIT);
    let out = dir.path().join("result.json");
    let mut cmd = cargo_bin_cmd!("ucnet");
    cmd.args(["--log-level", "error", "solve"])
        .arg(&path)
        .args(["--format", "json", "--horizon", "full", "--backend", "lambda"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["outcome"]["status"], "optimal");
    let objective = json["outcome"]["objective"].as_f64().unwrap();
    assert!((objective - 710.0).abs() < 1e-6);
    let states: Vec<&str> = json["outcome"]["schedule"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["state"].as_str().unwrap())
        .collect();
    assert_eq!(states, vec!["1", "1", "1"]);
}

#[test]
fn test_solve_reports_infeasible_horizon() {
    let dir = TempDir::new().unwrap();
    let text = SINGLE_UNIT.replace("demand = [5.0, 0.0, 5.0]", "demand = [5.0, 50.0, 5.0]");
    let path = write_problem(&dir, "short.toml", &text);
    let mut cmd = cargo_bin_cmd!("ucnet");
    cmd.args(["--log-level", "error", "solve"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: infeasible"));
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "single.toml", SINGLE_UNIT);
    let mut cmd = cargo_bin_cmd!("ucnet");
    let assert = cmd
        .args(["--log-level", "error", "inspect"])
        .arg(&path)
        .args(["--format", "json", "--no-prune"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["units"], 1);
    assert_eq!(json["build"]["candidate_nodes"], 6);
    assert_eq!(json["build"]["pruned_nodes"], 0);
    // 2 + 4 + 4 + 2
    assert_eq!(json["build"]["arcs"], 12);
}

#[test]
fn test_missing_file_fails() {
    let mut cmd = cargo_bin_cmd!("ucnet");
    cmd.args(["validate", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.toml"));
}
