//! # StackRS Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Thin, stateless wrappers over external tools, shared by the command
//! handlers. Each helper builds a `process::CommandSpec` and runs it, so the
//! exact command line can be checked in tests without executing anything.
//!
//! - **`git`**: bring a checkout to a tag, branch or review ref.
//! - **`image`**: download guest images and register them with the image service.
//! - **`ini`**: get/set/comment/uncomment options in INI-style config files.
//! - **`network`**: ping and SSH probes bounded by a deadline.
//! - **`process`**: `CommandSpec` and the runners every other helper uses.
//! - **`screen`**: start enabled services in windows of a screen session.
//! - **`system`**: host OS detection, service control and package installation.
//!
//! ```rust
//! use crate::common::{ini, system};
//! use std::path::Path;
//!
//! ini::ini_set(Path::new("/etc/nova/nova.conf"), "DEFAULT", "verbose", "True")?;
//! let os = system::host_os();
//! ```
//!

/// Git checkout synchronisation.
pub mod git;
/// Guest image download and upload.
pub mod image;
/// INI option editing.
pub mod ini;
/// Connectivity probes.
pub mod network;
/// External command description and execution.
pub mod process;
/// Screen session supervision.
pub mod screen;
/// Host detection, service control and package installation.
pub mod system;
