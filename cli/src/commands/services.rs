//! # StackRS Services Command
//!
//! File: cli/src/commands/services.rs
//!
//! ## Overview
//!
//! Implements `stackrs services`, the command-line face of the service
//! registry. The registry is not persisted: the current list comes from
//! `--services`, `ENABLED_SERVICES` or the configuration file, and the
//! mutating subcommands print the resulting list for the caller to store.
//!
//! ## Usage
//!
//! ```bash
//! stackrs services list
//! stackrs services check nova glance        # exit status 0 if either is enabled
//! export ENABLED_SERVICES=$(stackrs services enable swift -- -rabbit)
//! stackrs services disable n-novnc
//! stackrs services disable-all
//! ```
//!
use crate::core::config;
use crate::core::error::Result;
use crate::core::services::ServiceSet;
use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;

/// Arguments for the 'services' command group.
#[derive(Parser, Debug)]
pub struct ServicesArgs {
    /// Comma-delimited enabled services. Defaults to the configured list.
    #[arg(long, env = "ENABLED_SERVICES", global = true)]
    services: Option<String>,

    #[command(subcommand)]
    command: ServicesCommand,
}

#[derive(Subcommand, Debug)]
enum ServicesCommand {
    /// Print each enabled service on its own line
    List,
    /// Succeed if any of the given services (or groups) is enabled
    Check {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Enable services; a leading '-' removes a service instead
    Enable {
        #[arg(required = true, allow_hyphen_values = true)]
        names: Vec<String>,
    },
    /// Disable services (literal names only)
    Disable {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Disable every service
    DisableAll,
}

/// Resolves the starting set from the flag/env or the configuration.
pub(crate) fn current_services(flag: Option<&str>) -> Result<ServiceSet> {
    match flag {
        Some(raw) => Ok(ServiceSet::normalize(raw)),
        None => Ok(config::load_config()?.stack.services()),
    }
}

/// Main handler for 'stackrs services'.
pub async fn handle_services(args: ServicesArgs) -> Result<()> {
    let mut services = current_services(args.services.as_deref())?;
    info!("Starting service list: '{}' ({} services)", services, services.len());

    match args.command {
        ServicesCommand::List => {
            if services.is_empty() {
                info!("No services are enabled");
            }
            for service in services.iter() {
                println!("{}", service);
            }
        }
        ServicesCommand::Check { names } => {
            if services.contains_any(&names) {
                println!("enabled");
            } else {
                bail!("none of [{}] is enabled", names.join(", "));
            }
        }
        ServicesCommand::Enable { names } => {
            services.enable(&names);
            println!("{}", services);
        }
        ServicesCommand::Disable { names } => {
            services.disable(&names);
            println!("{}", services);
        }
        ServicesCommand::DisableAll => {
            services.disable_all();
            println!("{}", services);
        }
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_args_parsing() {
        let args =
            ServicesArgs::try_parse_from(["services", "--services", "key", "enable", "-rabbit"])
                .unwrap();
        assert_eq!(args.services.as_deref(), Some("key"));
        match args.command {
            ServicesCommand::Enable { names } => assert_eq!(names, vec!["-rabbit"]),
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(ServicesArgs::try_parse_from(["services", "check"]).is_err());
    }

    #[test]
    fn test_current_services_from_flag() {
        let services = current_services(Some("key,,mysql")).unwrap();
        assert_eq!(services.to_string(), "key,mysql");
    }

    #[tokio::test]
    async fn test_handle_check_fails_when_nothing_matches() {
        let args = ServicesArgs::try_parse_from([
            "services",
            "--services",
            "n-api",
            "check",
            "glance",
            "swift",
        ])
        .unwrap();
        let err = handle_services(args).await.unwrap_err();
        assert!(err.to_string().contains("none of [glance, swift] is enabled"));
    }
}
