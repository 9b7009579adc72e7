//! # StackRS CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `stackrs` binary: standard flags, the `help`
//! subcommand and unknown commands.
//!

mod common;

use common::stackrs_cmd;
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    stackrs_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_command_groups() {
    stackrs_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("services"))
        .stdout(predicate::str::contains("packages"))
        .stdout(predicate::str::contains("image"));
}

#[test]
fn test_help_subcommand() {
    stackrs_cmd()
        .args(["help", "ini"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uncomment"));
}

#[test]
fn test_unknown_command_fails() {
    stackrs_cmd()
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
