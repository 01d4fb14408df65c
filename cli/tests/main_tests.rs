//! # cmdrs CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `cmdrs` binary: `--help`, `--version`, and
//! argument errors.
//!
mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_command_groups() {
    cmdrs_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ps")
                .and(predicate::str::contains("run"))
                .and(predicate::str::contains("exec"))
                .and(predicate::str::contains("parse"))
                .and(predicate::str::contains("check")),
        );
}

#[test]
fn test_version_flag() {
    cmdrs_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_fails() {
    cmdrs_cmd().assert().failure();
}

#[test]
fn test_unknown_subcommand_fails() {
    cmdrs_cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_project_config_is_reported() {
    let dir = sandbox();
    write_project_config(&dir, "[executor]\ntimeout_secs = 0\n");
    cmdrs_in(&dir)
        .args(["parse", "kv"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs must be greater than zero"));
}

#[test]
fn test_zero_timeout_flag_is_rejected() {
    let dir = sandbox();
    cmdrs_in(&dir)
        .args(["--timeout", "0", "parse", "kv"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --timeout"));
}
