//! # StackRS CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test files. Each `.rs` file in
//! `cli/tests/` is compiled as a separate test crate that drives the built
//! `stackrs` binary.
//!

// Allow potentially unused code in this common module, as different test files might use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;

/// Creates an `assert_cmd::Command` for the compiled `stackrs` binary.
///
/// ## Panics
/// Panics if the `stackrs` binary cannot be found via `Command::cargo_bin`.
pub fn stackrs_cmd() -> Command {
    Command::cargo_bin("stackrs").expect("Failed to find stackrs binary for testing")
}

/// Like `stackrs_cmd`, but isolated from the developer's own configuration:
/// `home` stands in for the home and XDG config directories and is also the
/// working directory, so no `.stackrs.toml` further up is picked up.
pub fn isolated_cmd(home: &Path) -> Command {
    std::fs::create_dir_all(home.join(".git")).expect("Failed to create fake git root");
    let mut cmd = stackrs_cmd();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("ENABLED_SERVICES")
        .env_remove("OS_AUTH_TOKEN")
        .current_dir(home);
    cmd
}
