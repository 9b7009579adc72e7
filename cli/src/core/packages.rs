//! # StackRS Package Set Resolver
//!
//! File: cli/src/core/packages.rs
//!
//! ## Overview
//!
//! Works out which distribution packages to install for the enabled services.
//! A directory of per-service manifests (one plain-text file per service
//! group, plus `general`) lists packages one per line. Which manifests are read
//! depends on the `ServiceSet`; which lines survive depends on the distro tag.
//!
//! ## Manifest format
//!
//! ```text
//! curl
//! git                       # plain comment, stripped
//! python-libvirt #dist:f16,f17     # only on Fedora 16/17
//! libvirt-bin # NOPRIME     # never emitted here; installed by a later phase
//! ```
//!
//! ## Resolution order
//!
//! `general` first, then for each enabled service in set order:
//! `n-api` → `nova` and `glance`, `n-*` → `nova`, `c-*` → `cinder`,
//! `ceilometer-*` → `ceilometer`, `g-*` → `glance`, `key*` → `keystone`,
//! `q-*` → `quantum`, anything else → a manifest of the same name. Each manifest
//! is read at most once. Missing files are skipped.
//!
use crate::core::error::{Result, StackError};
use crate::core::services::ServiceSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Manifest that is always read first.
pub const GENERAL_MANIFEST: &str = "general";
/// Marks a package whose installation is deferred to a later phase.
pub const NOPRIME_MARKER: &str = "NOPRIME";
const DIST_MARKER: &str = "dist:";

/// Manifests contributed by a single enabled service.
fn manifests_for_service(service: &str) -> Vec<&str> {
    if service == "n-api" {
        vec!["nova", "glance"]
    } else if service.starts_with("n-") {
        vec!["nova"]
    } else if service.starts_with("ceilometer-") {
        vec!["ceilometer"]
    } else if service.starts_with("c-") {
        vec!["cinder"]
    } else if service.starts_with("g-") {
        vec!["glance"]
    } else if service.starts_with("key") {
        vec!["keystone"]
    } else if service.starts_with("q-") {
        vec!["quantum"]
    } else {
        vec![service]
    }
}

/// Ordered, de-duplicated manifest names for `services`.
pub fn manifest_names(services: &ServiceSet) -> Vec<String> {
    let mut names = vec![GENERAL_MANIFEST.to_string()];
    for service in services.iter() {
        for manifest in manifests_for_service(service) {
            if !names.iter().any(|n| n == manifest) {
                names.push(manifest.to_string());
            }
        }
    }
    names
}

/// Applies the manifest line rules. Returns the package to emit, if any.
pub fn filter_line(line: &str, distro: &str) -> Option<String> {
    if line.contains(NOPRIME_MARKER) {
        return None;
    }
    let package = match line.split_once('#') {
        Some((package, annotation)) => {
            if let Some(idx) = annotation.find(DIST_MARKER) {
                let distros = annotation[idx + DIST_MARKER.len()..]
                    .split_whitespace()
                    .next()
                    .unwrap_or("");
                let wanted = distros
                    .split(',')
                    .any(|d| !d.is_empty() && d.eq_ignore_ascii_case(distro));
                if !wanted {
                    return None;
                }
            }
            package
        }
        None => line,
    };
    let package = package.trim();
    (!package.is_empty()).then(|| package.to_string())
}

/// Lazy sequence of package names across the resolved manifests.
///
/// Each manifest is only opened once the previous one has been drained.
#[derive(Debug)]
pub struct PackageIter {
    manifests: std::vec::IntoIter<PathBuf>,
    lines: std::vec::IntoIter<String>,
    distro: String,
}

impl PackageIter {
    fn load_next_manifest(&mut self) -> bool {
        while let Some(path) = self.manifests.next() {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    debug!("Reading package manifest {}", path.display());
                    self.lines = content
                        .lines()
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                        .into_iter();
                    return true;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("No manifest at {}, skipping", path.display());
                }
                Err(e) => {
                    warn!("Could not read manifest {}: {}", path.display(), e);
                }
            }
        }
        false
    }
}

impl Iterator for PackageIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            for line in self.lines.by_ref() {
                if let Some(package) = filter_line(&line, &self.distro) {
                    return Some(package);
                }
            }
            if !self.load_next_manifest() {
                return None;
            }
        }
    }
}

/// Resolves the packages required by `services` on `distro`.
///
/// Fails with `StackError::InvalidInput` when no manifest directory is given.
/// Packages listed in several manifests are emitted once per listing.
pub fn resolve_packages(
    services: &ServiceSet,
    distro: &str,
    files_dir: Option<&Path>,
) -> Result<PackageIter> {
    let dir = files_dir.ok_or_else(|| {
        StackError::InvalidInput("no package manifest directory given".to_string())
    })?;
    let manifests: Vec<PathBuf> = manifest_names(services)
        .into_iter()
        .map(|name| dir.join(name))
        .collect();
    debug!(
        "Resolving packages for '{}' on '{}' from {} manifest(s)",
        services,
        distro,
        manifests.len()
    );
    Ok(PackageIter {
        manifests: manifests.into_iter(),
        lines: Vec::new().into_iter(),
        distro: distro.to_string(),
    })
}
