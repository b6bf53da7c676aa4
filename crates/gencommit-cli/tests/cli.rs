use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const FLEET: &str = r#"
name = "two-unit"

[[units]]
id = "G1"
p_max = 60.0
cost = 10.0

[[units]]
id = "G2"
p_max = 100.0
cost = 8.0
"#;

fn write_inputs(dir: &Path, demand: &str) -> (PathBuf, PathBuf) {
    let fleet = dir.join("fleet.toml");
    let request = dir.join("request.toml");
    fs::write(&fleet, FLEET).unwrap();
    fs::write(
        &request,
        format!("horizon = 1\ndemand = [{demand}]\nreserve = [0.0]\n"),
    )
    .unwrap();
    (fleet, request)
}

fn gencommit() -> Command {
    Command::cargo_bin("gencommit").unwrap()
}

#[test]
fn solve_prints_table() {
    let tmp = tempdir().unwrap();
    let (fleet, request) = write_inputs(tmp.path(), "80.0");

    gencommit()
        .args(["solve", "--fleet"])
        .arg(&fleet)
        .arg("--request")
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total cost: 640.00"))
        .stdout(predicate::str::contains("PERIOD"))
        .stdout(predicate::str::contains("8.00"));
}

#[test]
fn solve_json_and_output_file() {
    let tmp = tempdir().unwrap();
    let (fleet, request) = write_inputs(tmp.path(), "80.0");
    let out = tmp.path().join("out").join("schedule.json");

    let assert = gencommit()
        .args(["solve", "--format", "json", "--commitment", "--fleet"])
        .arg(&fleet)
        .arg("--request")
        .arg(&request)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["result"]["status"], "optimal");
    assert_eq!(json["report"]["outcome"], "schedule");
    assert!(out.exists());
}

#[test]
fn infeasible_solve_exits_with_status_two() {
    let tmp = tempdir().unwrap();
    let (fleet, request) = write_inputs(tmp.path(), "500.0");

    gencommit()
        .args(["solve", "--fleet"])
        .arg(&fleet)
        .arg("--request")
        .arg(&request)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Infeasible"));
}

#[test]
fn unknown_mip_solver_is_an_error() {
    let tmp = tempdir().unwrap();
    let (fleet, request) = write_inputs(tmp.path(), "80.0");

    gencommit()
        .args(["solve", "--mip-solver", "cplex", "--fleet"])
        .arg(&fleet)
        .arg("--request")
        .arg(&request)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cplex"));
}

#[test]
fn check_reports_model_size() {
    let tmp = tempdir().unwrap();
    let (fleet, request) = write_inputs(tmp.path(), "80.0");

    gencommit()
        .args(["check", "--fleet"])
        .arg(&fleet)
        .arg("--request")
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("Variables"))
        .stdout(predicate::str::contains("No issues"));
}

#[test]
fn check_rejects_missing_fleet_file() {
    let tmp = tempdir().unwrap();
    let (_, request) = write_inputs(tmp.path(), "80.0");

    let assert = gencommit()
        .args(["check", "--fleet"])
        .arg(tmp.path().join("absent.toml"))
        .arg("--request")
        .arg(&request)
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading fleet"));

    // reported once, not once per sink
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_eq!(stderr.matches("loading fleet").count(), 1, "{stderr}");
}

#[test]
fn sweep_writes_manifest() {
    let tmp = tempdir().unwrap();
    let (fleet, request) = write_inputs(tmp.path(), "80.0");
    let scenarios = tmp.path().join("scenarios.toml");
    fs::write(
        &scenarios,
        r#"
        [[scenarios]]
        scenario_id = "base"

        [[scenarios]]
        scenario_id = "high"
        demand_scale = 1.5
        "#,
    )
    .unwrap();
    let out = tmp.path().join("sweep");

    gencommit()
        .args(["sweep", "--threads", "2", "--fleet"])
        .arg(&fleet)
        .arg("--request")
        .arg(&request)
        .arg("--scenarios")
        .arg(&scenarios)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2/0 optimal/failed"));

    assert!(out.join("batch_manifest.json").exists());
    assert!(out.join("high").join("schedule.json").exists());
}
