//! # StackRS Probe Command
//!
//! File: cli/src/commands/probe.rs
//!
//! Implements `stackrs probe`, which blocks until a guest answers pings or
//! accepts SSH logins, or fails once the deadline passes.
//!
//! ```bash
//! stackrs probe ping 10.0.0.2 --timeout 60
//! stackrs probe ssh 10.0.0.2 --user cirros --key ~/.ssh/id_rsa
//! ```
//!
use crate::common::network;
use crate::core::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the 'probe' command group.
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Seconds to keep trying before giving up.
    #[arg(long, default_value_t = 60, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: ProbeCommand,
}

#[derive(Subcommand, Debug)]
enum ProbeCommand {
    /// Wait until the host answers a ping
    Ping { host: String },
    /// Wait until an SSH login to the host succeeds
    Ssh {
        host: String,
        #[arg(long, default_value = "cirros")]
        user: String,
        /// Private key. Defaults to ~/.ssh/id_rsa when it exists.
        #[arg(long)]
        key: Option<PathBuf>,
    },
}

fn default_key() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".ssh").join("id_rsa"))
        .filter(|path| path.is_file())
}

/// Handler for 'stackrs probe'.
pub async fn handle_probe(args: ProbeArgs) -> Result<()> {
    let timeout = Duration::from_secs(args.timeout);
    match args.command {
        ProbeCommand::Ping { host } => network::ping_check(&host, timeout).await,
        ProbeCommand::Ssh { host, user, key } => {
            let key = key.or_else(default_key);
            network::ssh_check(&host, &user, key.as_deref(), timeout).await
        }
    }
}
