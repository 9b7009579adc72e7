//! # StackRS OS / Distribution Detection
//!
//! File: cli/src/core/os.rs
//!
//! ## Overview
//!
//! Works out which operating system StackRS is running on and reduces it to an
//! `OsDescriptor` (vendor, release, update level, package family, codename) and
//! a short distro tag (`precise`, `f17`, `sle11sp2`, ...) used to filter package
//! manifests.
//!
//! ## Architecture
//!
//! Detection reads the platform through the `PlatformProbe` trait, so the same
//! parsing runs against the live host (`common::system::HostProbe`) and against
//! fixtures in tests. Signals are consulted in priority order:
//!
//! 1. `sw_vers` (macOS)
//! 2. `lsb_release`
//! 3. `/etc/redhat-release`, then `/etc/SuSE-release`
//!
//! The host descriptor is computed once per process by
//! `common::system::host_os()` and passed by reference to everything that
//! needs it.
//!
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

const REDHAT_RELEASE: &str = "/etc/redhat-release";
const SUSE_RELEASE: &str = "/etc/SuSE-release";

/// Source of platform signals for detection.
pub trait PlatformProbe {
    /// Trimmed stdout of `program args...`, or `None` if it is missing or fails.
    fn command_output(&self, program: &str, args: &[&str]) -> Option<String>;
    /// Contents of a file, or `None` if it cannot be read.
    fn read_file(&self, path: &Path) -> Option<String>;
}

/// Native package format of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFamily {
    Deb,
    Rpm,
}

impl fmt::Display for PackageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageFamily::Deb => f.write_str("deb"),
            PackageFamily::Rpm => f.write_str("rpm"),
        }
    }
}

/// Result of OS detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsDescriptor {
    pub vendor: String,
    pub release: String,
    pub update: String,
    /// `None` on hosts without a recognised package format (macOS, unknown).
    /// Callers treat anything that is not `Deb` like the rpm family.
    pub package: Option<PackageFamily>,
    pub codename: String,
}

impl OsDescriptor {
    /// Runs detection against `probe`.
    pub fn detect(probe: &dyn PlatformProbe) -> Self {
        let os = detect_sw_vers(probe)
            .or_else(|| detect_lsb_release(probe))
            .or_else(|| detect_redhat_release(probe))
            .or_else(|| detect_suse_release(probe))
            .unwrap_or_default();
        info!(
            "Detected OS: vendor='{}' release='{}' update='{}' package={:?} codename='{}'",
            os.vendor, os.release, os.update, os.package, os.codename
        );
        os
    }

    /// Short tag identifying the OS release for manifest filtering.
    pub fn distro_tag(&self) -> String {
        if self.vendor.contains("Ubuntu") {
            self.codename.clone()
        } else if self.vendor.contains("Fedora") {
            format!("f{}", self.release)
        } else if self.vendor.contains("openSUSE") {
            format!("opensuse-{}", self.release)
        } else if self.vendor.contains("SUSE LINUX") {
            if self.update.is_empty() {
                format!("sle{}", self.release)
            } else {
                format!("sle{}sp{}", self.release, self.update)
            }
        } else {
            format!("{}-{}.{}", self.vendor, self.release, self.update)
        }
    }

    pub fn is_deb(&self) -> bool {
        self.package == Some(PackageFamily::Deb)
    }

    pub fn is_ubuntu(&self) -> bool {
        self.is_deb()
    }

    pub fn is_fedora(&self) -> bool {
        ["Fedora", "Red Hat", "CentOS"]
            .iter()
            .any(|v| self.vendor.contains(v))
    }

    pub fn is_suse(&self) -> bool {
        self.vendor.contains("openSUSE") || self.vendor.contains("SUSE LINUX")
    }
}

fn mac_codename(release: &str) -> &'static str {
    match release {
        "10.4" => "tiger",
        "10.5" => "leopard",
        "10.6" => "snow leopard",
        "10.7" => "lion",
        "10.8" => "mountain lion",
        _ => "",
    }
}

/// Splits `a.b.c` into (`a.b`, `c`); a two-part version has no update.
fn split_mac_version(version: &str) -> (String, String) {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() > 2 {
        (parts[..2].join("."), parts[2..].join("."))
    } else {
        (version.to_string(), String::new())
    }
}

/// Splits `6.2` into (`6`, `2`); a dotless release has no update.
fn split_last_dot(version: &str) -> (String, String) {
    match version.rsplit_once('.') {
        Some((release, update)) => (release.to_string(), update.to_string()),
        None => (version.to_string(), String::new()),
    }
}

fn detect_sw_vers(probe: &dyn PlatformProbe) -> Option<OsDescriptor> {
    let vendor = probe.command_output("sw_vers", &["-productName"])?;
    let version = probe
        .command_output("sw_vers", &["-productVersion"])
        .unwrap_or_default();
    debug!("sw_vers reports '{}' '{}'", vendor, version);
    let (release, update) = split_mac_version(&version);
    let codename = mac_codename(&release).to_string();
    Some(OsDescriptor {
        vendor,
        release,
        update,
        package: None,
        codename,
    })
}

fn detect_lsb_release(probe: &dyn PlatformProbe) -> Option<OsDescriptor> {
    let mut vendor = probe.command_output("lsb_release", &["-i", "-s"])?;
    let release = probe
        .command_output("lsb_release", &["-r", "-s"])
        .unwrap_or_default();
    let codename = probe
        .command_output("lsb_release", &["-c", "-s"])
        .unwrap_or_default();
    let package = if vendor == "Debian" || vendor == "Ubuntu" {
        PackageFamily::Deb
    } else {
        PackageFamily::Rpm
    };
    if vendor == "SUSE LINUX" {
        let description = probe
            .command_output("lsb_release", &["-d", "-s"])
            .unwrap_or_default();
        if description.contains("openSUSE") {
            vendor = "openSUSE".to_string();
        }
    }
    Some(OsDescriptor {
        vendor,
        release,
        update: String::new(),
        package: Some(package),
        codename,
    })
}

/// Parses lines such as `Fedora release 16 (Verne)` or
/// `CentOS Linux release 6.0 (Final)`.
fn parse_redhat_release(content: &str) -> Option<(String, String)> {
    let line = content.lines().next()?.trim();
    let open = line.rfind('(')?;
    let close = line[open..].find(')')? + open;
    let codename = line[open + 1..close].trim().to_string();
    let version = line[..open].trim_end().rsplit(' ').next()?.to_string();
    Some((version, codename))
}

fn detect_redhat_release(probe: &dyn PlatformProbe) -> Option<OsDescriptor> {
    let content = probe.read_file(Path::new(REDHAT_RELEASE))?;
    let mut os = OsDescriptor {
        package: Some(PackageFamily::Rpm),
        ..Default::default()
    };
    if let Some(vendor) = ["Red Hat", "CentOS", "Fedora"]
        .into_iter()
        .find(|v| content.contains(v))
    {
        os.vendor = vendor.to_string();
        if let Some((version, codename)) = parse_redhat_release(&content) {
            let (release, update) = split_last_dot(&version);
            os.release = release;
            os.update = update;
            os.codename = codename;
        }
    }
    Some(os)
}

/// Value of a `KEY = value` line in a SuSE-release file.
fn suse_field(content: &str, key: &str) -> String {
    content
        .lines()
        .filter_map(|line| line.split_once(" = "))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default()
}

fn detect_suse_release(probe: &dyn PlatformProbe) -> Option<OsDescriptor> {
    let content = probe.read_file(Path::new(SUSE_RELEASE))?;
    let mut os = OsDescriptor {
        package: Some(PackageFamily::Rpm),
        ..Default::default()
    };
    let candidates = [("openSUSE", "openSUSE"), ("SUSE Linux", "SUSE LINUX")];
    if let Some((_, vendor)) = candidates.into_iter().find(|(m, _)| content.contains(m)) {
        os.vendor = vendor.to_string();
        os.codename = suse_field(&content, "CODENAME");
        os.release = suse_field(&content, "VERSION");
        os.update = suse_field(&content, "PATCHLEVEL");
    }
    Some(os)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Canned command output and file contents.
    #[derive(Default)]
    struct FakeProbe {
        commands: HashMap<String, String>,
        files: HashMap<PathBuf, String>,
    }

    impl FakeProbe {
        fn command(mut self, line: &str, output: &str) -> Self {
            self.commands.insert(line.to_string(), output.to_string());
            self
        }

        fn file(mut self, path: &str, content: &str) -> Self {
            self.files.insert(PathBuf::from(path), content.to_string());
            self
        }
    }

    impl PlatformProbe for FakeProbe {
        fn command_output(&self, program: &str, args: &[&str]) -> Option<String> {
            let line = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.commands.get(&line).cloned()
        }

        fn read_file(&self, path: &Path) -> Option<String> {
            self.files.get(path).cloned()
        }
    }

    fn ubuntu_probe(vendor: &str) -> FakeProbe {
        FakeProbe::default()
            .command("lsb_release -i -s", vendor)
            .command("lsb_release -r -s", "12.04")
            .command("lsb_release -c -s", "precise")
    }

    #[test]
    fn test_detect_ubuntu_via_lsb_release() {
        let os = OsDescriptor::detect(&ubuntu_probe("Ubuntu"));
        assert_eq!(os.vendor, "Ubuntu");
        assert_eq!(os.release, "12.04");
        assert_eq!(os.package, Some(PackageFamily::Deb));
        assert!(os.is_ubuntu());
        assert_eq!(os.distro_tag(), "precise");
    }

    #[test]
    fn test_detect_fedora_via_lsb_release() {
        let probe = FakeProbe::default()
            .command("lsb_release -i -s", "Fedora")
            .command("lsb_release -r -s", "17")
            .command("lsb_release -c -s", "BeefyMiracle");
        let os = OsDescriptor::detect(&probe);
        assert_eq!(os.package, Some(PackageFamily::Rpm));
        assert!(os.is_fedora());
        assert_eq!(os.distro_tag(), "f17");
    }

    #[test]
    fn test_lsb_release_opensuse_override() {
        let probe = FakeProbe::default()
            .command("lsb_release -i -s", "SUSE LINUX")
            .command("lsb_release -r -s", "12.2")
            .command("lsb_release -c -s", "Mantis")
            .command("lsb_release -d -s", "\"openSUSE 12.2 (x86_64)\"");
        let os = OsDescriptor::detect(&probe);
        assert_eq!(os.vendor, "openSUSE");
        assert!(os.is_suse());
        assert_eq!(os.distro_tag(), "opensuse-12.2");
    }

    #[test]
    fn test_detect_mac_via_sw_vers() {
        let probe = FakeProbe::default()
            .command("sw_vers -productName", "Mac OS X")
            .command("sw_vers -productVersion", "10.7.4")
            // sw_vers wins over lsb_release
            .command("lsb_release -i -s", "Ubuntu");
        let os = OsDescriptor::detect(&probe);
        assert_eq!(os.vendor, "Mac OS X");
        assert_eq!(os.release, "10.7");
        assert_eq!(os.update, "4");
        assert_eq!(os.codename, "lion");
        assert_eq!(os.package, None);
        assert_eq!(os.distro_tag(), "Mac OS X-10.7.4");
    }

    #[test]
    fn test_mac_unknown_release_has_empty_codename() {
        let probe = FakeProbe::default()
            .command("sw_vers -productName", "Mac OS X")
            .command("sw_vers -productVersion", "10.9");
        let os = OsDescriptor::detect(&probe);
        assert_eq!(os.release, "10.9");
        assert_eq!(os.codename, "");
    }

    #[test]
    fn test_detect_centos_release_file() {
        let probe =
            FakeProbe::default().file(REDHAT_RELEASE, "CentOS Linux release 6.2 (Final)\n");
        let os = OsDescriptor::detect(&probe);
        assert_eq!(os.vendor, "CentOS");
        assert_eq!(os.release, "6");
        assert_eq!(os.update, "2");
        assert_eq!(os.codename, "Final");
        assert_eq!(os.package, Some(PackageFamily::Rpm));
        assert_eq!(os.distro_tag(), "CentOS-6.2");
    }

    #[test]
    fn test_detect_fedora_release_file() {
        let probe = FakeProbe::default().file(REDHAT_RELEASE, "Fedora release 16 (Verne)\n");
        let os = OsDescriptor::detect(&probe);
        assert_eq!(os.vendor, "Fedora");
        assert_eq!(os.release, "16");
        assert_eq!(os.codename, "Verne");
        assert_eq!(os.distro_tag(), "f16");
    }

    #[test]
    fn test_detect_sle_release_file() {
        let content = "SUSE Linux Enterprise Server 11 (x86_64)\nVERSION = 11\nPATCHLEVEL = 2\n";
        let os = OsDescriptor::detect(&FakeProbe::default().file(SUSE_RELEASE, content));
        assert_eq!(os.vendor, "SUSE LINUX");
        assert_eq!(os.release, "11");
        assert_eq!(os.update, "2");
        assert_eq!(os.distro_tag(), "sle11sp2");
    }

    #[test]
    fn test_sle_without_patchlevel() {
        let os = OsDescriptor {
            vendor: "SUSE LINUX".into(),
            release: "11".into(),
            ..Default::default()
        };
        assert_eq!(os.distro_tag(), "sle11");
    }

    #[test]
    fn test_detect_opensuse_release_file() {
        let content = "openSUSE 12.1 (x86_64)\nVERSION = 12.1\nCODENAME = Asparagus\n";
        let os = OsDescriptor::detect(&FakeProbe::default().file(SUSE_RELEASE, content));
        assert_eq!(os.vendor, "openSUSE");
        assert_eq!(os.codename, "Asparagus");
        assert_eq!(os.distro_tag(), "opensuse-12.1");
    }

    #[test]
    fn test_unknown_host_falls_back_to_empty_descriptor() {
        let os = OsDescriptor::detect(&FakeProbe::default());
        assert_eq!(os, OsDescriptor::default());
        assert!(!os.is_deb());
        assert_eq!(os.distro_tag(), "-.");
    }
}
