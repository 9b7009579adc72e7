//! # StackRS Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Every helper in StackRS ends up running an external tool: a package manager,
//! git, screen, ping, ssh, the image client. Helpers first build a
//! `CommandSpec` (program, arguments, environment, sudo, working directory,
//! optional stdin file) and
//! then hand it to one of the runners here. Building and running are separate
//! so tests can assert on the exact command line without executing it.
//!
//! ## Runners
//!
//! - `run`: inherit stdio, fail on non-zero exit
//! - `output`: capture stdout, fail on non-zero exit (stderr goes into the error)
//! - `succeeds`: exit status only, output discarded
//! - `succeeds_async`: as `succeeds`, on the tokio runtime (used by probes)
//!
//! ## Usage
//!
//! ```rust
//! let spec = CommandSpec::new("apt-get")
//!     .args(["--assume-yes", "install", "curl"])
//!     .env("DEBIAN_FRONTEND", "noninteractive")
//!     .sudo();
//! println!("{}", spec); // sudo DEBIAN_FRONTEND=noninteractive apt-get --assume-yes install curl
//! spec.run()?;
//! ```
//!
use crate::core::error::{Result, StackError};
use anyhow::Context;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Description of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub sudo: bool,
    pub cwd: Option<PathBuf>,
    /// File fed to the child's stdin.
    pub stdin: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn envs<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env.extend(vars);
        self
    }

    /// Run through `sudo`; environment is passed as `KEY=value` arguments.
    pub fn sudo(mut self) -> Self {
        self.sudo = true;
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn stdin_file(mut self, path: &Path) -> Self {
        self.stdin = Some(path.to_path_buf());
        self
    }

    fn to_command(&self) -> Result<Command> {
        let mut command = if self.sudo {
            let mut c = Command::new("sudo");
            c.args(self.env.iter().map(|(k, v)| format!("{}={}", k, v)));
            c.arg(&self.program);
            c
        } else {
            let mut c = Command::new(&self.program);
            c.envs(self.env.iter().map(|(k, v)| (k, v)));
            c
        };
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        if let Some(path) = &self.stdin {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {} for '{}'", path.display(), self))?;
            command.stdin(Stdio::from(file));
        }
        Ok(command)
    }

    /// Runs with inherited stdio.
    pub fn run(&self) -> Result<()> {
        debug!("Running: {}", self);
        let status = self
            .to_command()?
            .status()
            .with_context(|| format!("Failed to execute '{}'", self))?;
        if !status.success() {
            return Err(StackError::ExternalCommand {
                cmd: self.to_string(),
                status: status.to_string(),
                output: String::new(),
            }
            .into());
        }
        Ok(())
    }

    /// Runs and returns trimmed stdout.
    pub fn output(&self) -> Result<String> {
        debug!("Capturing: {}", self);
        let mut command = self.to_command()?;
        if self.stdin.is_none() {
            command.stdin(Stdio::null());
        }
        let output = command
            .output()
            .with_context(|| format!("Failed to execute '{}'", self))?;
        if !output.status.success() {
            return Err(StackError::ExternalCommand {
                cmd: self.to_string(),
                status: output.status.to_string(),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// True if the command could be started and exited zero.
    pub fn succeeds(&self) -> bool {
        let result = self.to_command().and_then(|mut command| {
            if self.stdin.is_none() {
                command.stdin(Stdio::null());
            }
            Ok(command
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()?)
        });
        debug!("Status of '{}': {:?}", self, result);
        matches!(result, Ok(status) if status.success())
    }

    /// Async variant of `succeeds`; the child is killed if the future is dropped.
    pub async fn succeeds_async(&self) -> bool {
        let Ok(std_command) = self.to_command() else {
            return false;
        };
        let mut command = tokio::process::Command::from(std_command);
        if self.stdin.is_none() {
            command.stdin(Stdio::null());
        }
        command
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        matches!(command.status().await, Ok(status) if status.success())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.sudo {
            parts.push("sudo".to_string());
        }
        parts.extend(self.env.iter().map(|(k, v)| format!("{}={}", k, v)));
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        f.write_str(&parts.join(" "))
    }
}
