//! # StackRS Package Installer (`common::system::installer`)
//!
//! File: cli/src/common/system/installer.rs
//!
//! ## Overview
//!
//! Chooses and drives the host package manager:
//!
//! | Host                  | Tool                                                               |
//! |-----------------------|--------------------------------------------------------------------|
//! | deb family            | `apt-get --option Dpkg::Options::=--force-confold --assume-yes install` |
//! | openSUSE / SUSE LINUX | `zypper --non-interactive install --auto-agree-with-licenses`      |
//! | anything else         | `yum install -y`                                                   |
//!
//! Unrecognised hosts take the yum branch. Installs run under `sudo` with the
//! configured proxy variables. When the stack is offline nothing is executed.
//!
use crate::common::process::CommandSpec;
use crate::core::config::ProxyConfig;
use crate::core::error::Result;
use crate::core::os::OsDescriptor;
use tracing::{debug, info};

const PIP_DOWNLOAD_CACHE: &str = "/var/cache/pip";

/// Package installation bound to one host and one proxy/offline policy.
#[derive(Debug, Clone, Copy)]
pub struct Installer<'a> {
    os: &'a OsDescriptor,
    proxy: &'a ProxyConfig,
    offline: bool,
}

impl<'a> Installer<'a> {
    pub fn new(os: &'a OsDescriptor, proxy: &'a ProxyConfig, offline: bool) -> Self {
        Self { os, proxy, offline }
    }

    /// The package manager invocation for `packages`, or `None` if empty.
    pub fn package_command(&self, packages: &[String]) -> Option<CommandSpec> {
        if packages.is_empty() {
            return None;
        }
        let spec = if self.os.is_ubuntu() {
            CommandSpec::new("apt-get")
                .env("DEBIAN_FRONTEND", "noninteractive")
                .args([
                    "--option",
                    "Dpkg::Options::=--force-confold",
                    "--assume-yes",
                    "install",
                ])
        } else if self.os.is_suse() {
            CommandSpec::new("zypper").args([
                "--non-interactive",
                "install",
                "--auto-agree-with-licenses",
            ])
        } else {
            if !self.os.is_fedora() {
                debug!("Unrecognised distro '{}', falling back to yum", self.os.vendor);
            }
            CommandSpec::new("yum").args(["install", "-y"])
        };
        Some(
            spec.envs(self.proxy.env_pairs())
                .args(packages.iter().cloned())
                .sudo(),
        )
    }

    /// Installs `packages` with the host package manager.
    pub fn install_packages(&self, packages: &[String]) -> Result<()> {
        let Some(command) = self.package_command(packages) else {
            return Ok(());
        };
        if self.offline {
            info!("Offline: skipping install of {} package(s)", packages.len());
            return Ok(());
        }
        info!("Installing {} package(s)", packages.len());
        command.run()
    }

    /// `pip install` invocation for `packages`, or `None` if empty.
    pub fn pip_command(&self, packages: &[String]) -> Option<CommandSpec> {
        if packages.is_empty() {
            return None;
        }
        let pip = if self.os.is_ubuntu() {
            "/usr/local/bin/pip"
        } else {
            "/usr/bin/pip-python"
        };
        let proxies = self
            .proxy
            .env_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_ascii_uppercase(), v));
        Some(
            CommandSpec::new(pip)
                .env("PIP_DOWNLOAD_CACHE", PIP_DOWNLOAD_CACHE)
                .envs(proxies)
                .args(["install", "--use-mirrors"])
                .args(packages.iter().cloned())
                .sudo(),
        )
    }

    pub fn pip_install(&self, packages: &[String]) -> Result<()> {
        let Some(command) = self.pip_command(packages) else {
            return Ok(());
        };
        if self.offline {
            info!("Offline: skipping pip install of {} package(s)", packages.len());
            return Ok(());
        }
        command.run()
    }

    /// Query command for a single installed package.
    pub fn query_command(&self, package: &str) -> CommandSpec {
        if self.os.is_ubuntu() {
            CommandSpec::new("dpkg").args(["-l", package])
        } else {
            CommandSpec::new("rpm").args(["--quiet", "-q", package])
        }
    }

    pub fn is_package_installed(&self, package: &str) -> bool {
        self.query_command(package).succeeds()
    }
}

/// Location of a project's rootwrap binary.
pub fn rootwrap_location(os: &OsDescriptor, module: &str) -> String {
    let bin = if os.is_deb() || os.is_suse() {
        "/usr/local/bin"
    } else {
        "/usr/bin"
    };
    format!("{}/{}-rootwrap", bin, module)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::os::PackageFamily;

    fn os(vendor: &str, package: Option<PackageFamily>) -> OsDescriptor {
        OsDescriptor {
            vendor: vendor.to_string(),
            package,
            ..Default::default()
        }
    }

    fn pkgs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apt_command_on_ubuntu() {
        let ubuntu = os("Ubuntu", Some(PackageFamily::Deb));
        let proxy = ProxyConfig {
            http_proxy: Some("http://p:3128".into()),
            ..Default::default()
        };
        let installer = Installer::new(&ubuntu, &proxy, false);
        let cmd = installer.package_command(&pkgs(&["curl", "git"])).unwrap();
        assert_eq!(
            cmd.to_string(),
            "sudo DEBIAN_FRONTEND=noninteractive http_proxy=http://p:3128 apt-get \
             --option Dpkg::Options::=--force-confold --assume-yes install curl git"
        );
    }

    #[test]
    fn test_zypper_command_on_suse() {
        let suse = os("openSUSE", Some(PackageFamily::Rpm));
        let proxy = ProxyConfig::default();
        let cmd = Installer::new(&suse, &proxy, false)
            .package_command(&pkgs(&["curl"]))
            .unwrap();
        assert_eq!(
            cmd.to_string(),
            "sudo zypper --non-interactive install --auto-agree-with-licenses curl"
        );
    }

    #[test]
    fn test_unknown_vendor_falls_back_to_yum() {
        let unknown = OsDescriptor::default();
        let proxy = ProxyConfig::default();
        let cmd = Installer::new(&unknown, &proxy, false)
            .package_command(&pkgs(&["curl"]))
            .unwrap();
        assert_eq!(cmd.to_string(), "sudo yum install -y curl");

        let fedora = os("Fedora", Some(PackageFamily::Rpm));
        assert!(fedora.is_fedora());
        let cmd = Installer::new(&fedora, &proxy, false)
            .package_command(&pkgs(&["curl"]))
            .unwrap();
        assert_eq!(cmd.to_string(), "sudo yum install -y curl");
    }

    #[test]
    fn test_empty_list_and_offline_are_noops() {
        let ubuntu = os("Ubuntu", Some(PackageFamily::Deb));
        let proxy = ProxyConfig::default();
        let online = Installer::new(&ubuntu, &proxy, false);
        assert!(online.package_command(&[]).is_none());
        assert!(online.install_packages(&[]).is_ok());
        assert!(online.pip_install(&[]).is_ok());

        // Offline never reaches sudo/apt-get.
        let offline = Installer::new(&ubuntu, &proxy, true);
        assert!(offline.install_packages(&pkgs(&["curl"])).is_ok());
        assert!(offline.pip_install(&pkgs(&["pep8"])).is_ok());
    }

    #[test]
    fn test_pip_command_per_family() {
        let proxy = ProxyConfig {
            https_proxy: Some("http://p:3128".into()),
            ..Default::default()
        };
        let fedora = os("Fedora", Some(PackageFamily::Rpm));
        let cmd = Installer::new(&fedora, &proxy, false)
            .pip_command(&pkgs(&["pep8"]))
            .unwrap();
        assert_eq!(
            cmd.to_string(),
            "sudo PIP_DOWNLOAD_CACHE=/var/cache/pip HTTPS_PROXY=http://p:3128 \
             /usr/bin/pip-python install --use-mirrors pep8"
        );
        let ubuntu = os("Ubuntu", Some(PackageFamily::Deb));
        let cmd = Installer::new(&ubuntu, &proxy, false)
            .pip_command(&pkgs(&["pep8"]))
            .unwrap();
        assert_eq!(cmd.program, "/usr/local/bin/pip");
    }

    #[test]
    fn test_query_command() {
        let proxy = ProxyConfig::default();
        let ubuntu = os("Ubuntu", Some(PackageFamily::Deb));
        assert_eq!(
            Installer::new(&ubuntu, &proxy, false)
                .query_command("curl")
                .to_string(),
            "dpkg -l curl"
        );
        let fedora = os("Fedora", Some(PackageFamily::Rpm));
        assert_eq!(
            Installer::new(&fedora, &proxy, false)
                .query_command("curl")
                .to_string(),
            "rpm --quiet -q curl"
        );
    }

    #[test]
    fn test_rootwrap_location() {
        assert_eq!(
            rootwrap_location(&os("Ubuntu", Some(PackageFamily::Deb)), "nova"),
            "/usr/local/bin/nova-rootwrap"
        );
        assert_eq!(
            rootwrap_location(&os("SUSE LINUX", Some(PackageFamily::Rpm)), "cinder"),
            "/usr/local/bin/cinder-rootwrap"
        );
        assert_eq!(
            rootwrap_location(&os("Fedora", Some(PackageFamily::Rpm)), "nova"),
            "/usr/bin/nova-rootwrap"
        );
    }
}
