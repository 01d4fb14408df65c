//! # cmdrs CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test runs
//! the compiled `cmdrs` binary inside a throwaway directory so that neither a
//! user config nor a `.cmdrs.toml` from the developer's checkout leaks in.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// A `cmdrs` command for the binary under test.
pub fn cmdrs_cmd() -> Command {
    Command::cargo_bin("cmdrs").expect("Failed to find cmdrs binary for testing")
}

/// An isolated working directory. It contains a `.git` marker so the project
/// config search stops here, and doubles as `XDG_CONFIG_HOME`/`HOME`.
pub fn sandbox() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
    dir
}

/// Writes `.cmdrs.toml` into the sandbox.
pub fn write_project_config(dir: &TempDir, toml: &str) {
    fs::write(dir.path().join(".cmdrs.toml"), toml).expect("Failed to write .cmdrs.toml");
}

/// `cmdrs_cmd()` running inside `dir` with user config lookups redirected there.
pub fn cmdrs_in(dir: &TempDir) -> Command {
    let mut cmd = cmdrs_cmd();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .env_remove("RUST_LOG");
    cmd
}
