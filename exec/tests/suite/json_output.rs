#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::Command;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn minion_exec(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("minion-exec").unwrap();
    cmd.env("MINION_HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

fn json_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each stdout line is JSON"))
        .collect()
}

#[test]
fn emits_one_event_per_mutation() {
    let home = TempDir::new().unwrap();
    let output = minion_exec(&home)
        .args(["--json", "--session", "fallback"])
        .arg(fixture("permission_flow.ndjson"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let events = json_lines(&output.stdout);
    let types: Vec<&str> = events
        .iter()
        .map(|event| event["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec![
            "toolcall.started",
            "toolcall.permission_required",
            "toolcall.updated",
            "toolcall.completed",
            "toolcall.started",
            "toolcall.permission_required",
            "toolcall.completed",
            "toolcall.permission_required",
            "toolcall.started",
            "session.terminated",
        ]
    );

    // The request without a session id lands in the default session as a
    // historical record.
    assert_eq!(events[7]["session_id"], "fallback");
    assert_eq!(events[7]["tool_call"]["id"], "historical_r3");
    assert_eq!(events[7]["tool_call"]["is_historical"], true);

    assert_eq!(events[6]["tool_call"]["result"]["content"], "Not in CI");
    assert_eq!(
        events[9]["orphaned_tool_call_ids"],
        serde_json::json!(["t3"])
    );
}

#[test]
fn reads_transcript_from_stdin() {
    let home = TempDir::new().unwrap();
    minion_exec(&home)
        .args(["--json", "-"])
        .write_stdin(
            "{\"session_id\":\"s1\",\"type\":\"tool_use\",\"id\":\"t1\",\"name\":\"Read\",\"input\":{}}\n",
        )
        .assert()
        .success()
        .stdout(predicates::str::contains("\"type\":\"toolcall.started\""));
}

#[test]
fn invalid_line_fails_with_its_number() {
    let home = TempDir::new().unwrap();
    minion_exec(&home)
        .arg("--json")
        .arg(fixture("truncated.ndjson"))
        .assert()
        .failure()
        .stdout(predicates::str::contains("toolcall.started"))
        .stderr(predicates::str::contains("invalid transcript line 2"));
}
