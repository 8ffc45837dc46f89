#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn config_toml_in_minion_home_is_applied() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        r#"
orphaned_message = "Agent crashed"

[summary]
max_listed_params = 1
"#,
    )
    .unwrap();

    Command::cargo_bin("minion-exec")
        .unwrap()
        .env("MINION_HOME", home.path())
        .args(["--color", "never"])
        .arg(fixture("permission_flow.ndjson"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Agent crashed"))
        .stdout(predicate::str::contains("❓ Write(2 parameters) - Awaiting Permission"));
}

#[test]
fn explicit_config_file_wins_over_home() {
    let home = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let config = other.path().join("replay.toml");
    std::fs::write(&config, "orphaned_message = \"From explicit file\"\n").unwrap();

    Command::cargo_bin("minion-exec")
        .unwrap()
        .env("MINION_HOME", home.path())
        .args(["--color", "never", "--config"])
        .arg(&config)
        .arg(fixture("permission_flow.ndjson"))
        .assert()
        .success()
        .stdout(predicate::str::contains("From explicit file"));
}

#[test]
fn unparsable_config_is_an_error() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "orphaned_message = [").unwrap();

    Command::cargo_bin("minion-exec")
        .unwrap()
        .env("MINION_HOME", home.path())
        .arg(fixture("permission_flow.ndjson"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}
