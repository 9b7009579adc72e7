//! # StackRS Service Command
//!
//! File: cli/src/commands/service.rs
//!
//! Implements `stackrs service`: start, stop or restart a system service
//! (rabbitmq-server, mysql, apache2, ...) through the host's `service` binary.
//!
//! ```bash
//! stackrs service restart rabbitmq-server
//! ```
//!
use crate::common::system;
use crate::core::error::Result;
use clap::{Parser, Subcommand};

/// Arguments for the 'service' command group.
#[derive(Parser, Debug)]
pub struct ServiceArgs {
    #[command(subcommand)]
    command: ServiceCommand,
}

#[derive(Subcommand, Debug)]
enum ServiceCommand {
    /// Start a system service
    Start { name: String },
    /// Stop a system service
    Stop { name: String },
    /// Restart a system service
    Restart { name: String },
}

/// Handler for 'stackrs service'.
pub async fn handle_service(args: ServiceArgs) -> Result<()> {
    let os = system::host_os();
    match args.command {
        ServiceCommand::Start { name } => system::start_service(os, &name),
        ServiceCommand::Stop { name } => system::stop_service(os, &name),
        ServiceCommand::Restart { name } => system::restart_service(os, &name),
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_args_parsing() {
        let args = ServiceArgs::try_parse_from(["service", "restart", "mysql"]).unwrap();
        match args.command {
            ServiceCommand::Restart { name } => assert_eq!(name, "mysql"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(ServiceArgs::try_parse_from(["service", "reload", "mysql"]).is_err());
    }
}
