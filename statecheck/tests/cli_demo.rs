//! CLI tests for the `statecheck` binary.
//!
//! Spawns the binary and checks exit codes and the JSON report it prints.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use statecheck::exit_codes;

fn statecheck(args: &[&str]) -> (Option<i32>, Value) {
    let temp = tempfile::tempdir().expect("tempdir");
    statecheck_in(temp.path(), args)
}

fn statecheck_in(dir: &Path, args: &[&str]) -> (Option<i32>, Value) {
    let output = Command::new(env!("CARGO_BIN_EXE_statecheck"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run statecheck");
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let json = serde_json::from_str(&stdout).unwrap_or(Value::Null);
    (output.status.code(), json)
}

#[test]
fn correct_demo_passes() {
    let (code, report) = statecheck(&["demo", "--seed", "1", "--trials", "20"]);
    assert_eq!(code, Some(exit_codes::OK));
    assert_eq!(report["trials"], 20);
    assert!(report.get("failure").is_none());
}

#[test]
fn buggy_demo_reports_failure_that_replays() {
    let (code, report) = statecheck(&[
        "demo",
        "--seed",
        "3",
        "--trials",
        "500",
        "--capacity",
        "2",
        "--buggy",
    ]);
    assert_eq!(code, Some(exit_codes::FAILED));
    let failure = &report["failure"];
    assert_eq!(failure["status"], "failed");
    assert_eq!(failure["kind"], "assertion");

    let draws = choices_arg(failure);
    let (code, replayed) = statecheck(&[
        "replay",
        "--draws",
        &draws,
        "--capacity",
        "2",
        "--buggy",
    ]);
    assert_eq!(code, Some(exit_codes::FAILED));
    assert_eq!(replayed["message"], failure["message"]);
    assert_eq!(replayed["trace"], failure["trace"]);
}

#[test]
fn replay_reads_the_config_the_demo_used() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        temp.path().join("statecheck.toml"),
        "max_costly_attempts = 1\n",
    )
    .expect("write config");

    let (code, report) = statecheck_in(temp.path(), &["demo", "--seed", "1", "--trials", "50"]);
    assert_eq!(code, Some(exit_codes::FAILED));
    let failure = &report["failure"];
    assert_eq!(failure["kind"], "no_valid_action");

    let draws = choices_arg(failure);
    let (code, replayed) = statecheck_in(temp.path(), &["replay", "--draws", &draws]);
    assert_eq!(code, Some(exit_codes::FAILED));
    assert_eq!(replayed["kind"], "no_valid_action");
    assert_eq!(replayed["message"], failure["message"]);
    assert_eq!(replayed["trace"], failure["trace"]);
}

fn choices_arg(failure: &Value) -> String {
    failure["choices"]
        .as_array()
        .expect("choices")
        .iter()
        .map(|value| value.as_u64().expect("u64").to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[test]
fn invalid_config_exits_with_invalid_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("bad.toml");
    std::fs::write(&config, "steps = 0\n").expect("write");

    let status = Command::new(env!("CARGO_BIN_EXE_statecheck"))
        .arg("demo")
        .arg("--config")
        .arg(&config)
        .status()
        .expect("run statecheck");

    assert_eq!(status.code(), Some(exit_codes::INVALID));
}
