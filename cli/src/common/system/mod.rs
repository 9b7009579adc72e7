//! # StackRS System Utilities Module (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//!
//! ## Overview
//!
//! Host-facing helpers:
//!
//! - **`HostProbe`**: the live `PlatformProbe` used for OS detection.
//! - **`host_os`**: detects the host once per process and hands out the cached
//!   `OsDescriptor`.
//! - **Service control**: start/stop/restart system services with the
//!   distro-appropriate `service` binary.
//! - **`installer`**: package manager and pip dispatch.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::system::{self, installer};
//!
//! let os = system::host_os();
//! system::restart_service(os, "rabbitmq-server")?;
//! println!("{}", installer::rootwrap_location(os, "nova"));
//! ```
//!
pub mod installer;

use crate::common::process::CommandSpec;
use crate::core::error::Result;
use crate::core::os::{OsDescriptor, PlatformProbe};
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

/// Reads platform signals from the running host.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl PlatformProbe for HostProbe {
    fn command_output(&self, program: &str, args: &[&str]) -> Option<String> {
        CommandSpec::new(program)
            .args(args.iter().copied())
            .output()
            .ok()
            .map(|out| out.trim_matches('"').to_string())
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

static HOST_OS: OnceLock<OsDescriptor> = OnceLock::new();

/// The host's OS descriptor, detected on first use.
pub fn host_os() -> &'static OsDescriptor {
    HOST_OS.get_or_init(|| OsDescriptor::detect(&HostProbe))
}

fn service_binary(os: &OsDescriptor) -> &'static str {
    if os.is_deb() {
        "/usr/sbin/service"
    } else {
        "/sbin/service"
    }
}

/// `sudo service <name> <action>` for the host's service binary.
pub fn service_command(os: &OsDescriptor, name: &str, action: &str) -> CommandSpec {
    CommandSpec::new(service_binary(os))
        .args([name, action])
        .sudo()
}

pub fn start_service(os: &OsDescriptor, name: &str) -> Result<()> {
    info!("Starting service {}", name);
    service_command(os, name, "start").run()
}

pub fn stop_service(os: &OsDescriptor, name: &str) -> Result<()> {
    info!("Stopping service {}", name);
    service_command(os, name, "stop").run()
}

pub fn restart_service(os: &OsDescriptor, name: &str) -> Result<()> {
    info!("Restarting service {}", name);
    service_command(os, name, "restart").run()
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::os::PackageFamily;

    #[test]
    fn test_service_command_per_family() {
        let deb = OsDescriptor {
            package: Some(PackageFamily::Deb),
            ..Default::default()
        };
        assert_eq!(
            service_command(&deb, "apache2", "restart").to_string(),
            "sudo /usr/sbin/service apache2 restart"
        );
        let unknown = OsDescriptor::default();
        assert_eq!(
            service_command(&unknown, "httpd", "stop").to_string(),
            "sudo /sbin/service httpd stop"
        );
    }

    #[test]
    fn test_host_probe_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release");
        std::fs::write(&path, "Fedora release 17 (Beefy Miracle)\n").unwrap();
        assert!(HostProbe.read_file(&path).unwrap().starts_with("Fedora"));
        assert!(HostProbe.read_file(&dir.path().join("missing")).is_none());
    }

    #[test]
    fn test_host_probe_missing_command() {
        assert!(HostProbe
            .command_output("nonexistent_stackrs_probe_cmd", &[])
            .is_none());
    }

    #[test]
    fn test_host_os_is_cached() {
        let first = host_os() as *const OsDescriptor;
        let second = host_os() as *const OsDescriptor;
        assert_eq!(first, second);
    }
}
