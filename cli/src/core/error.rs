//! # StackRS Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout StackRS. Specific,
//! matchable failures are variants of `StackError` (derived with `thiserror`);
//! everything is propagated as `anyhow::Error` so call sites can attach
//! context with `anyhow::Context`.
//!
//! ## Architecture
//!
//! - `StackError`: the enum of domain failures (bad input, config problems,
//!   failed external commands, unresolvable git refs, probe timeouts, ...)
//! - `Result<T>`: alias for `anyhow::Result<T>`
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if files_dir.is_none() {
//!     return Err(StackError::InvalidInput("no manifest directory given".into()))?;
//! }
//!
//! // Match on it further up
//! match result {
//!     Err(e) if e.downcast_ref::<StackError>().map_or(false, |se| matches!(se, StackError::ProbeTimeout { .. })) => {
//!         println!("host never came up");
//!     }
//!     other => other?,
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the StackRS application.
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },

    #[error("'{git_ref}' is neither a tag nor a branch of {remote}")]
    GitRefNotFound { remote: String, git_ref: String },

    #[error("{probe} check of '{host}' timed out after {seconds}s")]
    ProbeTimeout {
        probe: String,
        host: String,
        seconds: u64,
    },

    #[error("Unsupported image format: {0}")]
    UnsupportedImage(String),

    #[error("INI error: {0}")]
    Ini(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
