//! Runs the `signalboard` binary end to end.

use assert_cmd::Command;
use predicates::prelude::*;

const SNAPSHOT: &str = r#"{
    "accountId": 1,
    "eventTypes": [{
        "name": "SystemSample",
        "volume": 4,
        "attributes": [
            {"name": "cpuPercent", "type": "number"},
            {"name": "memoryUsedPercent", "type": "number"}
        ]
    }]
}"#;

fn signalboard() -> Command {
    let mut cmd = Command::cargo_bin("signalboard").unwrap();
    cmd.env_remove("NEW_RELIC_API_KEY")
        .env_remove("NEW_RELIC_ACCOUNT_ID")
        .env_remove("NEW_RELIC_REGION")
        .env_remove("SIGNALBOARD_CONFIG");
    cmd
}

#[test]
fn classify_prints_categories() {
    signalboard()
        .args(["classify", "broker.messagesInPerSecond", "request.avgTimeFetch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("throughput"))
        .stdout(predicate::str::contains("latency"));
}

#[test]
fn analyze_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("snapshot.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    signalboard()
        .args(["--format", "json", "analyze"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"account_id\": 1"));
}

#[test]
fn build_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("snapshot.json");
    let output = dir.path().join("out.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    signalboard()
        .arg("build")
        .arg(&snapshot)
        .arg("--output")
        .arg(&output)
        .args(["--name", "Hosts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dashboard: Hosts"));

    let saved = std::fs::read_to_string(&output).unwrap();
    assert!(saved.contains("\"All Metrics Catalog\""));
}

#[test]
fn deploy_without_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("snapshot.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    signalboard()
        .arg("build")
        .arg(&snapshot)
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .arg("--deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is required"));
}

#[test]
fn missing_snapshot_fails() {
    signalboard()
        .args(["analyze", "/nonexistent/snapshot.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: IO error"));
}
