//! # StackRS Git Command
//!
//! File: cli/src/commands/git.rs
//!
//! Implements `stackrs git`: brings a checkout to a tag, branch or review ref.
//!
//! ```bash
//! stackrs git https://github.com/openstack/nova.git /opt/stack/nova master
//! stackrs git https://review.openstack.org/p/openstack/nova /opt/stack/nova refs/changes/12/3412/2
//! stackrs git --reclone https://github.com/openstack/glance.git /opt/stack/glance 2012.2
//! ```
//!
//! `--offline` and `--reclone` fall back to `stack.offline` / `stack.reclone`
//! from the configuration when not given.
//!
use crate::common::git::{self, GitOptions};
use crate::core::config;
use crate::core::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Arguments for the 'git' command.
#[derive(Parser, Debug)]
pub struct GitArgs {
    /// Repository to clone from.
    remote: String,
    /// Checkout directory.
    dest: PathBuf,
    /// Tag, branch or `refs/changes/...` ref to check out.
    #[arg(default_value = "master")]
    git_ref: String,
    /// Refresh an existing checkout instead of leaving it alone.
    #[arg(long)]
    reclone: bool,
    /// Do not touch the network at all.
    #[arg(long)]
    offline: bool,
}

/// Handler for 'stackrs git'.
pub async fn handle_git(args: GitArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let opts = GitOptions {
        offline: args.offline || cfg.stack.is_offline(),
        reclone: args.reclone || cfg.stack.is_reclone(),
    };
    git::git_clone(&args.remote, &args.dest, &args.git_ref, opts)
}
