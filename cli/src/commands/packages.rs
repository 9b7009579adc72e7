//! # StackRS Packages Command
//!
//! File: cli/src/commands/packages.rs
//!
//! ## Overview
//!
//! Implements `stackrs packages`: resolves the distribution packages needed by
//! the enabled services from the manifest directory and prints them, one per
//! line. With `--install` the list is handed to the host package manager.
//!
//! ## Usage
//!
//! ```bash
//! stackrs packages --files-dir ~/devstack/files/apts
//! stackrs packages --files-dir ~/devstack/files/rpms --distro f17
//! stackrs packages --files-dir ~/devstack/files/apts --missing
//! stackrs packages --files-dir ~/devstack/files/apts --install
//! ```
//!
use crate::common::system::{self, installer::Installer};
use crate::core::config;
use crate::core::error::Result;
use crate::core::packages::resolve_packages;
use crate::core::services::ServiceSet;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the 'packages' command.
#[derive(Parser, Debug)]
pub struct PackagesArgs {
    /// Comma-delimited enabled services. Defaults to the configured list.
    #[arg(long, env = "ENABLED_SERVICES")]
    services: Option<String>,
    /// Directory with the per-service manifests. Defaults to `stack.files_dir`.
    #[arg(long)]
    files_dir: Option<PathBuf>,
    /// Distro tag to filter on instead of the detected one (e.g. precise, f17).
    #[arg(long)]
    distro: Option<String>,
    /// Only list packages the host package database does not know about.
    #[arg(long)]
    missing: bool,
    /// Install the resolved packages instead of only printing them.
    #[arg(long)]
    install: bool,
    /// Skip the actual package manager call.
    #[arg(long)]
    offline: bool,
}

/// Handler for 'stackrs packages'.
pub async fn handle_packages(args: PackagesArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let services = match args.services.as_deref() {
        Some(raw) => ServiceSet::normalize(raw),
        None => cfg.stack.services(),
    };
    let files_dir = args
        .files_dir
        .or_else(|| cfg.stack.files_dir.as_ref().map(PathBuf::from));
    let distro = match args.distro {
        Some(tag) => tag,
        None => system::host_os().distro_tag(),
    };
    info!("Resolving packages for distro '{}'", distro);

    let offline = args.offline || cfg.stack.is_offline();
    let installer = Installer::new(system::host_os(), &cfg.proxy, offline);
    let mut packages: Vec<String> =
        resolve_packages(&services, &distro, files_dir.as_deref())?.collect();
    if args.missing {
        packages.retain(|package| !installer.is_package_installed(package));
    }
    for package in &packages {
        println!("{}", package);
    }

    if args.install {
        installer.install_packages(&packages)?;
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packages_args_parsing() {
        let args = PackagesArgs::try_parse_from([
            "packages",
            "--files-dir",
            "/tmp/apts",
            "--distro",
            "precise",
            "--install",
        ])
        .unwrap();
        assert_eq!(args.files_dir, Some(PathBuf::from("/tmp/apts")));
        assert_eq!(args.distro.as_deref(), Some("precise"));
        assert!(args.install);
        assert!(!args.offline);
    }
}
