//! # StackRS Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level command groups of the StackRS CLI.
//! Each module defines a Clap arguments struct and an async `handle_*`
//! function that `main.rs` routes to.
//!
//! ## Command Groups
//!
//! - `services`: inspect and edit the enabled-service list
//! - `packages`: resolve (and optionally install) distribution packages
//! - `pip`: install python packages
//! - `service`: start, stop or restart a system service
//! - `os`: report the detected host OS
//! - `ini`: edit INI-style configuration files
//! - `git`: sync a source checkout to a ref
//! - `probe`: wait for a guest to answer ping or SSH
//! - `screen`: start a service in the screen session
//! - `image`: fetch and register a guest image
//!

/// Enabled-service list. Includes `list`, `check`, `enable`, `disable`, `disable-all`.
pub mod services;
/// Package resolution from per-service manifests.
pub mod packages;
/// Python package installation.
pub mod pip;
/// System service control. Includes `start`, `stop`, `restart`.
pub mod service;
/// Host OS report.
pub mod os;
/// INI option editing. Includes `get`, `set`, `comment`, `uncomment`.
pub mod ini;
/// Git checkout synchronisation.
pub mod git;
/// Ping and SSH probes. Includes `ping`, `ssh`.
pub mod probe;
/// Screen window launcher.
pub mod screen;
/// Guest image upload.
pub mod image;
