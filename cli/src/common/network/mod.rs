//! # StackRS Network Utilities Module (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//!
//! ## Overview
//!
//! Connectivity probes used after booting instances or bringing up services:
//! keep trying `ping` (or `ssh ... echo success`) once a second until the host
//! answers or the caller's deadline passes. Running out of time is reported as
//! `StackError::ProbeTimeout`; there is no retry beyond the deadline.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::network;
//! use std::time::Duration;
//!
//! network::ping_check("10.0.0.3", Duration::from_secs(60)).await?;
//! network::ssh_check("10.0.0.3", "cirros", None, Duration::from_secs(60)).await?;
//! ```
//!
use crate::common::process::CommandSpec;
use crate::core::error::{Result, StackError};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Pause between probe attempts.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(1);

pub fn ping_command(host: &str) -> CommandSpec {
    CommandSpec::new("ping").args(["-c1", "-w1", host])
}

pub fn ssh_command(host: &str, user: &str, key: Option<&Path>) -> CommandSpec {
    let mut spec = CommandSpec::new("ssh").args([
        "-o",
        "StrictHostKeyChecking=no",
        "-o",
        "UserKnownHostsFile=/dev/null",
        "-o",
        "BatchMode=yes",
        "-o",
        "ConnectTimeout=1",
    ]);
    if let Some(key) = key {
        spec = spec.arg("-i").arg(key.to_string_lossy());
    }
    spec.arg(format!("{}@{}", user, host)).args(["echo", "success"])
}

/// Runs `check` every `interval` until it succeeds or `timeout` elapses.
pub async fn wait_for(
    probe: &str,
    host: &str,
    check: &CommandSpec,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let poll = async {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if check.succeeds_async().await {
                return attempt;
            }
            debug!("{} {} attempt {} failed", probe, host, attempt);
            tokio::time::sleep(interval).await;
        }
    };
    match tokio::time::timeout(timeout, poll).await {
        Ok(attempts) => {
            info!("{} check of {} succeeded after {} attempt(s)", probe, host, attempts);
            Ok(())
        }
        Err(_) => Err(StackError::ProbeTimeout {
            probe: probe.to_string(),
            host: host.to_string(),
            seconds: timeout.as_secs(),
        }
        .into()),
    }
}

pub async fn ping_check(host: &str, timeout: Duration) -> Result<()> {
    wait_for("ping", host, &ping_command(host), timeout, PROBE_INTERVAL).await
}

pub async fn ssh_check(host: &str, user: &str, key: Option<&Path>, timeout: Duration) -> Result<()> {
    wait_for("ssh", host, &ssh_command(host, user, key), timeout, PROBE_INTERVAL).await
}
