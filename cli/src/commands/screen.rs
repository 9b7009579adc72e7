//! # StackRS Screen Command
//!
//! File: cli/src/commands/screen.rs
//!
//! Implements `stackrs screen`: starts a service in its own window of the
//! screen session, provided the service is enabled.
//!
//! ```bash
//! stackrs screen n-api -- cd /opt/stack/nova && ./bin/nova-api
//! ```
//!
use crate::common::screen;
use crate::core::config;
use crate::core::error::Result;
use crate::core::services::ServiceSet;
use clap::Parser;

/// Arguments for the 'screen' command.
#[derive(Parser, Debug)]
pub struct ScreenArgs {
    /// Service (window) name.
    service: String,
    /// Command typed into the window.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
    /// Comma-delimited enabled services. Defaults to the configured list.
    #[arg(long, env = "ENABLED_SERVICES")]
    services: Option<String>,
    /// Screen session name. Defaults to `stack.screen_name`.
    #[arg(long)]
    session: Option<String>,
}

/// Handler for 'stackrs screen'.
pub async fn handle_screen(args: ScreenArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let services = match args.services.as_deref() {
        Some(raw) => ServiceSet::normalize(raw),
        None => cfg.stack.services(),
    };
    let session = args.session.unwrap_or(cfg.stack.screen_name);
    let started = screen::screen_it(&services, &session, &args.service, &args.command.join(" "))?;
    if !started {
        println!("{} is not enabled", args.service);
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_args_trailing_command() {
        let args =
            ScreenArgs::try_parse_from(["screen", "--session", "dev", "key", "keystone-all", "--debug"])
                .unwrap();
        assert_eq!(args.service, "key");
        assert_eq!(args.session.as_deref(), Some("dev"));
        assert_eq!(args.command, vec!["keystone-all", "--debug"]);
    }

    #[tokio::test]
    async fn test_disabled_service_is_skipped() {
        let args = ScreenArgs::try_parse_from([
            "screen",
            "--services",
            "key,mysql",
            "swift",
            "swift-proxy-server",
        ])
        .unwrap();
        assert!(handle_screen(args).await.is_ok());
    }
}
