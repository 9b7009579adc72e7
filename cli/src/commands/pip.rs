//! # StackRS Pip Command
//!
//! File: cli/src/commands/pip.rs
//!
//! Implements `stackrs pip`: installs python packages with the host's pip,
//! forwarding the configured proxies.
//!
//! ```bash
//! stackrs pip python-novaclient python-glanceclient
//! ```
//!
use crate::common::system::{self, installer::Installer};
use crate::core::config;
use crate::core::error::Result;
use clap::Parser;

/// Arguments for the 'pip' command.
#[derive(Parser, Debug)]
pub struct PipArgs {
    /// Python packages (pip requirement specifiers).
    #[arg(required = true)]
    packages: Vec<String>,
    /// Skip the actual pip call.
    #[arg(long)]
    offline: bool,
}

/// Handler for 'stackrs pip'.
pub async fn handle_pip(args: PipArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let offline = args.offline || cfg.stack.is_offline();
    Installer::new(system::host_os(), &cfg.proxy, offline).pip_install(&args.packages)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pip_args_require_packages() {
        assert!(PipArgs::try_parse_from(["pip"]).is_err());
        let args = PipArgs::try_parse_from(["pip", "pbr>=0.5", "--offline"]).unwrap();
        assert_eq!(args.packages, vec!["pbr>=0.5"]);
        assert!(args.offline);
    }

    #[tokio::test]
    async fn test_offline_pip_is_a_no_op() {
        let args = PipArgs::try_parse_from(["pip", "--offline", "pbr"]).unwrap();
        assert!(handle_pip(args).await.is_ok());
    }
}
