//! # StackRS Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the StackRS CLI, a toolbox of
//! the host-level chores a development cloud installer performs: tracking
//! enabled services, resolving and installing packages, editing service
//! configuration, syncing source checkouts, probing guests and uploading
//! images. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to appropriate command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! stackrs --help
//!
//! # Resolve packages with debug logging
//! stackrs -vv packages --files-dir ~/devstack/files/apts
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Route to appropriate command handler
//! 4. Format and display any errors that occur
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers (services, packages, ini, ...)
mod common; // Wrappers over external tools (git, screen, package managers, ...)
mod core; // Core infrastructure (errors, config, service registry, OS detection)

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "stackrs",
    about = "StackRS: host helpers for bootstrapping a development cloud",
    long_about = "Track enabled services, resolve and install packages, edit service\n\
                  configuration, sync git checkouts, probe guests and upload images.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "s")]
    Services(commands::services::ServicesArgs),
    #[command(alias = "p")]
    Packages(commands::packages::PackagesArgs),
    Pip(commands::pip::PipArgs),
    Service(commands::service::ServiceArgs),
    Os(commands::os::OsArgs),
    Ini(commands::ini::IniArgs),
    Git(commands::git::GitArgs),
    Probe(commands::probe::ProbeArgs),
    Screen(commands::screen::ScreenArgs),
    Image(commands::image::ImageArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Services(args) => commands::services::handle_services(args).await,
        Commands::Packages(args) => commands::packages::handle_packages(args).await,
        Commands::Pip(args) => commands::pip::handle_pip(args).await,
        Commands::Service(args) => commands::service::handle_service(args).await,
        Commands::Os(args) => commands::os::handle_os(args).await,
        Commands::Ini(args) => commands::ini::handle_ini(args).await,
        Commands::Git(args) => commands::git::handle_git(args).await,
        Commands::Probe(args) => commands::probe::handle_probe(args).await,
        Commands::Screen(args) => commands::screen::handle_screen(args).await,
        Commands::Image(args) => commands::image::handle_image(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
