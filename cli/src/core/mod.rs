//! # StackRS Core
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! The designed part of StackRS. Everything here is pure logic over values
//! handed in by the command layer:
//! - `config`: configuration loading, merging and validation
//! - `error`: `StackError` and the `Result` alias
//! - `os`: OS/distro detection and the distro tag
//! - `packages`: package manifest resolution
//! - `services`: the enabled-service registry
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{StackError, Result}; // For error handling
//! use crate::core::services::ServiceSet; // Enabled services
//! ```
//!
pub mod config;
pub mod error;
pub mod os;
pub mod packages;
pub mod services;
