//! # StackRS Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! Loads, merges and validates StackRS settings: which services are enabled,
//! where manifests and checkouts live, whether the host is offline, proxy
//! settings for package managers, and where the image service listens.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags / environment variables (applied by the command handlers)
//! 2. Project-specific `.stackrs.toml` in the current directory or ancestors
//! 3. User-specific `config.toml` in the platform config directory
//! 4. Default values defined in the code
//!
//! ## Example
//!
//! ```toml
//! [stack]
//! enabled_services = "g-api,g-reg,key,n-api,n-cpu,mysql,rabbit"
//! files_dir = "~/devstack/files"
//! offline = false
//!
//! [proxy]
//! http_proxy = "http://proxy.local:3128"
//!
//! [images]
//! glance_hostport = "127.0.0.1:9292"
//! ```
//!
use crate::core::error::{Result, StackError};
use crate::core::services::ServiceSet;
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub stack: StackConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

/// Core settings of the stack being bootstrapped.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    /// Comma-delimited enabled service list.
    #[serde(default = "default_enabled_services")]
    pub enabled_services: String,
    /// Root directory for git checkouts (can use ~).
    #[serde(default = "default_dest")]
    pub dest: String,
    /// Directory holding per-service package manifests (can use ~).
    #[serde(default)]
    pub files_dir: Option<String>,
    /// Suppress package installs, pip installs, downloads and git traffic.
    /// Accepts the usual yes/no spellings.
    #[serde(default)]
    pub offline: Option<Switch>,
    /// Re-fetch existing checkouts.
    #[serde(default)]
    pub reclone: Option<Switch>,
    /// Name of the screen session services run in.
    #[serde(default = "default_screen_name")]
    pub screen_name: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            enabled_services: default_enabled_services(),
            dest: default_dest(),
            files_dir: None,
            offline: None,
            reclone: None,
            screen_name: default_screen_name(),
        }
    }
}

impl StackConfig {
    pub fn services(&self) -> ServiceSet {
        ServiceSet::normalize(&self.enabled_services)
    }

    pub fn is_offline(&self) -> bool {
        self.offline.as_ref().is_some_and(|s| s.enabled(false))
    }

    pub fn is_reclone(&self) -> bool {
        self.reclone.as_ref().is_some_and(|s| s.enabled(false))
    }
}

/// A yes/no setting written either as a TOML boolean or as a string such as
/// `"yes"`, `"False"` or `"1"`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Switch {
    Bool(bool),
    Text(String),
}

impl Switch {
    /// Resolved value; unrecognised strings give `default`.
    pub fn enabled(&self, default: bool) -> bool {
        match self {
            Switch::Bool(value) => *value,
            Switch::Text(text) => trueorfalse(default, Some(text)),
        }
    }
}

/// Proxy variables forwarded to package managers and pip.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
}

impl ProxyConfig {
    /// `(name, value)` pairs for every proxy that is set.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        [
            ("http_proxy", &self.http_proxy),
            ("https_proxy", &self.https_proxy),
            ("no_proxy", &self.no_proxy),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }
}

/// Image service settings (`stackrs image`).
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    /// `host:port` of the image API.
    #[serde(default = "default_glance_hostport")]
    pub glance_hostport: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            glance_hostport: default_glance_hostport(),
        }
    }
}

fn default_enabled_services() -> String {
    "g-api,g-reg,key,n-api,n-crt,n-obj,n-cpu,n-net,n-cond,cinder,c-sch,c-api,c-vol,n-sch,n-novnc,n-xvnc,n-cauth,horizon,mysql,rabbit".to_string()
}
fn default_dest() -> String {
    "/opt/stack".to_string()
}
fn default_screen_name() -> String {
    "stack".to_string()
}
fn default_glance_hostport() -> String {
    "127.0.0.1:9292".to_string()
}

/// Normalizes a yes/no style setting. Unset or unrecognised values give `default`.
pub fn trueorfalse(default: bool, value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if ["1", "yes", "true", "on", "y"].contains(&v.as_str()) => true,
        Some(v) if ["0", "no", "false", "off", "n"].contains(&v.as_str()) => false,
        _ => default,
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".stackrs.toml";

pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("org", "StackRS", "stackrs") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.stackrs.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks up from `start` looking for `.stackrs.toml`, stopping at a git root.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.stack.enabled_services =
        if project_cfg.stack.enabled_services != default_enabled_services() {
            project_cfg.stack.enabled_services
        } else {
            user.stack.enabled_services
        };
    merged.stack.dest = if project_cfg.stack.dest != default_dest() {
        project_cfg.stack.dest
    } else {
        user.stack.dest
    };
    merged.stack.screen_name = if project_cfg.stack.screen_name != default_screen_name() {
        project_cfg.stack.screen_name
    } else {
        user.stack.screen_name
    };
    merged.stack.files_dir = project_cfg.stack.files_dir.or(user.stack.files_dir);
    merged.stack.offline = project_cfg.stack.offline.or(user.stack.offline);
    merged.stack.reclone = project_cfg.stack.reclone.or(user.stack.reclone);
    merged.proxy = ProxyConfig {
        http_proxy: project_cfg.proxy.http_proxy.or(user.proxy.http_proxy),
        https_proxy: project_cfg.proxy.https_proxy.or(user.proxy.https_proxy),
        no_proxy: project_cfg.proxy.no_proxy.or(user.proxy.no_proxy),
    };
    merged.images.glance_hostport =
        if project_cfg.images.glance_hostport != default_glance_hostport() {
            project_cfg.images.glance_hostport
        } else {
            user.images.glance_hostport
        };
    merged
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.stack.dest = shellexpand::tilde(&config.stack.dest).into_owned();
    if let Some(files_dir) = config.stack.files_dir.as_mut() {
        *files_dir = shellexpand::tilde(files_dir.as_str()).into_owned();
        debug!("Expanded files directory: {}", files_dir);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    if let Some(files_dir) = &config.stack.files_dir {
        let dir = PathBuf::from(files_dir);
        if !dir.exists() {
            warn!("Configured files directory '{}' does not exist.", dir.display());
        } else if !dir.is_dir() {
            return Err(anyhow!(StackError::Config(format!(
                "Configured files path '{}' exists but is not a directory.",
                dir.display()
            ))));
        }
    }
    if config.images.glance_hostport.matches(':').count() != 1 {
        return Err(anyhow!(StackError::Config(format!(
            "Invalid glance_hostport: '{}'. Expected HOST:PORT.",
            config.images.glance_hostport
        ))));
    }
    if config.stack.screen_name.trim().is_empty() {
        return Err(anyhow!(StackError::Config(
            "screen_name cannot be empty.".to_string()
        )));
    }
    Ok(())
}
