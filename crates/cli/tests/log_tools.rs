// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests for `rk inspect` and `rk verify`

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use rk_core::{encode, Record};
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a log of encoded records plus any raw lines appended after them
fn write_log(dir: &TempDir, records: &[Record], raw: &[&str]) -> PathBuf {
    let path = dir.path().join("store.log");
    let mut lines: Vec<String> = records.iter().map(|r| encode(r).unwrap()).collect();
    lines.extend(raw.iter().map(|s| s.to_string()));
    std::fs::write(&path, format!("{}\n", lines.join("\n"))).unwrap();
    path
}

fn rk() -> Command {
    Command::cargo_bin("rk").unwrap()
}

#[test]
fn test_help_lists_commands() {
    rk().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_inspect_prints_records() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        &[
            Record::new("a", "news", "hello").with_timestamps(1, 1),
            Record::new("b", "sports", "goal").with_timestamps(2, 3),
        ],
        &[],
    );

    rk().arg("inspect")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("news/a"))
        .stdout(predicate::str::contains("hello"))
        .stdout(predicate::str::contains("sports/b"))
        .stdout(predicate::str::contains("updated=3"));
}

#[test]
fn test_inspect_filters_by_topic() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        &[
            Record::new("a", "news", "hello").with_timestamps(1, 1),
            Record::new("b", "sports", "goal").with_timestamps(2, 2),
        ],
        &[],
    );

    rk().args(["inspect", "--topic", "sports"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("sports/b"))
        .stdout(predicate::str::contains("news/a").not());
}

#[test]
fn test_inspect_json_emits_one_object_per_line() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        &[Record::new("a", "news", "hello").with_timestamps(5, 6)],
        &[],
    );

    let output = rk()
        .args(["inspect", "--format", "json"])
        .arg(&log)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let entries: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["line"], 1);
    assert_eq!(entries[0]["key"], "a");
    assert_eq!(entries[0]["topic"], "news");
    assert_eq!(entries[0]["created_at"], 5);
    assert_eq!(entries[0]["updated_at"], 6);
}

#[test]
fn test_inspect_reports_bad_lines_on_stderr() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        &[Record::new("a", "t", "x").with_timestamps(1, 1)],
        &["not base64!"],
    );

    rk().arg("inspect")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("t/a"))
        .stderr(predicate::str::contains("line 2: corrupt_entry"));
}

#[test]
fn test_verify_clean_log_succeeds() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        &[
            Record::new("a", "t", "x").with_timestamps(1, 1),
            Record::new("b", "t", "y").with_timestamps(2, 2),
        ],
        &[],
    );

    rk().arg("verify")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"lines:\s+2").unwrap())
        .stdout(predicate::str::is_match(r"valid:\s+2").unwrap());
}

#[test]
fn test_verify_fails_on_corruption() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        &[Record::new("a", "t", "x").with_timestamps(1, 1)],
        &["@@@@", "aGVsbG8gd29ybGQ="],
    );

    rk().args(["verify", "--format", "json"])
        .arg(&log)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"corrupt_entry\": 1"))
        .stdout(predicate::str::contains("\"decompression_failed\": 1"))
        .stderr(predicate::str::contains("2 of 3 lines failed"));
}

#[test]
fn test_missing_log_is_an_error() {
    rk().args(["verify", "/nonexistent/store.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("log not found"));
}
