//! Integration tests for the `curb` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the compile,
//! check, classify and slots subcommands through the actual binary, including
//! stdin/stdout piping, file I/O and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn curb() -> Command {
    let mut cmd = Command::cargo_bin("curb").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// compile
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn compile_file_to_stdout() {
    let rules = stdout_json(curb().args(["compile", "-i", &fixture("rows.json")]));

    assert_eq!(rules.as_array().unwrap().len(), 1);
    let agenda = &rules[0]["agenda"];
    assert_eq!(agenda["1"], serde_json::json!([[13.0, 17.0]]));
    assert_eq!(agenda["2"], serde_json::json!([[8.0, 12.0]]));
    assert_eq!(agenda["6"], serde_json::json!([null]));
}

#[test]
fn compile_stdin_to_file() {
    let dir = std::env::temp_dir().join(format!("curb-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("rules.json");
    let rows = std::fs::read_to_string(fixture("rows.json")).unwrap();

    curb()
        .args(["compile", "-o", out.to_str().unwrap()])
        .write_stdin(rows)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written[0]["code"], "SLR-ST-105");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn compile_rejects_invalid_json() {
    curb()
        .arg("compile")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse input JSON"));
}

#[test]
fn missing_input_file_fails() {
    curb()
        .args(["compile", "-i", "/nonexistent/rows.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_blocked_without_permit() {
    curb()
        .args(["check", "-i", &fixture("rules.json")])
        .args(["--checkin", "2015-04-07T09:30", "--duration", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"blocked\": true"));
}

#[test]
fn check_allowed_with_matching_permit() {
    curb()
        .args(["check", "-i", &fixture("rules.json")])
        .args(["--checkin", "2015-04-07T09:30", "--duration", "1", "--permit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"blocked\": false"));
}

#[test]
fn check_raw_rows() {
    // Tuesday 13h: only Monday/Wednesday/Friday afternoons are restricted.
    let verdict = stdout_json(
        curb()
            .args(["check", "--raw", "-i", &fixture("rows.json")])
            .args(["--checkin", "2015-04-07T13:00", "--duration", "2"]),
    );
    assert_eq!(verdict["blocked"], false);
}

#[test]
fn check_rejects_bad_checkin() {
    curb()
        .args(["check", "-i", &fixture("rules.json"), "--checkin", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --checkin"));
}

#[test]
fn check_rejects_zero_duration() {
    curb()
        .args(["check", "-i", &fixture("rules.json")])
        .args(["--checkin", "2015-04-07T09:30", "--duration", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid query"));
}

#[test]
fn check_defaults_to_now() {
    curb()
        .args(["check", "-i", &fixture("rules.json"), "--permit", "all"])
        .env("CURB_TIMEZONE", "UTC")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"blocked\""));
}

#[test]
fn unknown_timezone_fails() {
    curb()
        .args(["check", "-i", &fixture("rules.json"), "--timezone", "Mars/Olympus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone"));
}

// ─────────────────────────────────────────────────────────────────────────────
// classify and slots
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn classify_free_rules() {
    let result = stdout_json(
        curb()
            .args(["classify", "-i", &fixture("rules.json")])
            .args(["--checkin", "2015-04-07T10:00"]),
    );
    assert_eq!(result["restrict_typ"], Value::Null);
}

#[test]
fn slots_drop_blocked_and_annotate() {
    let slots = stdout_json(
        curb()
            .args(["slots", "-i", &fixture("slots.json")])
            .args(["--checkin", "2015-04-07T10:00", "--duration", "1"]),
    );
    let slots = slots.as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["id"], 2);
    assert_eq!(slots[0]["restrict_typ"], "paid");
    assert_eq!(slots[1]["id"], 3);
    assert_eq!(slots[1]["restrict_typ"], Value::Null);
}

#[test]
fn slots_free_only() {
    let slots = stdout_json(
        curb()
            .args(["slots", "-i", &fixture("slots.json"), "--free-only"])
            .args(["--checkin", "2015-04-07T13:00"]),
    );
    let ids: Vec<i64> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [1, 3]);
}

#[test]
fn logs_stay_off_stdout() {
    let slots = stdout_json(
        curb()
            .env("RUST_LOG", "debug")
            .args(["slots", "-i", &fixture("slots.json")])
            .args(["--checkin", "2015-04-07T10:00"]),
    );
    assert!(slots.is_array());
}

#[test]
fn help_lists_subcommands() {
    curb()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compile"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("slots"));
}
