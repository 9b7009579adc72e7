//! # StackRS Git Checkout Sync (`common::git`)
//!
//! File: cli/src/common/git.rs
//!
//! ## Overview
//!
//! Brings a project checkout under `dest` to a requested ref.
//!
//! - Offline: nothing is touched.
//! - `refs/changes/...` (review refs): clone if needed, fetch the ref from the
//!   remote and check out `FETCH_HEAD`.
//! - Missing checkout: clone, then check out the ref.
//! - Existing checkout with reclone: fetch branches and tags, drop stale
//!   `*.pyc` files, then resolve the ref as a tag, a remote branch or a local
//!   branch, in that order. A ref that is none of these stops the sync with
//!   `StackError::GitRefNotFound`.
//! - Existing checkout without reclone: left as is.
//!
use crate::common::process::CommandSpec;
use crate::core::error::{Result, StackError};
use anyhow::Context;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// How aggressively to refresh a checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GitOptions {
    pub offline: bool,
    pub reclone: bool,
}

fn git(dest: &Path) -> CommandSpec {
    CommandSpec::new("git").current_dir(dest)
}

fn ref_exists(dest: &Path, full_ref: &str) -> bool {
    git(dest)
        .args(["show-ref", "--verify", "--quiet", full_ref])
        .succeeds()
}

fn clone_into(remote: &str, dest: &Path) -> Result<()> {
    info!("Cloning {} into {}", remote, dest.display());
    CommandSpec::new("git")
        .arg("clone")
        .arg(remote)
        .arg(dest.to_string_lossy())
        .run()
}

/// Deletes compiled python files left behind by a previous checkout.
fn remove_pyc_files(dest: &Path) -> Result<()> {
    for entry in WalkDir::new(dest).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "pyc") {
            debug!("Removing {}", path.display());
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

/// Syncs `dest` with `git_ref` from `remote`.
pub fn git_clone(remote: &str, dest: &Path, git_ref: &str, opts: GitOptions) -> Result<()> {
    if opts.offline {
        info!("Offline: leaving {} untouched", dest.display());
        return Ok(());
    }

    if git_ref.starts_with("refs/changes/") {
        if !dest.exists() {
            clone_into(remote, dest)?;
        }
        git(dest).args(["fetch", remote, git_ref]).run()?;
        return git(dest).args(["checkout", "FETCH_HEAD"]).run();
    }

    if !dest.exists() {
        clone_into(remote, dest)?;
        return git(dest).args(["checkout", git_ref]).run();
    }

    if !opts.reclone {
        debug!("{} exists and reclone is off", dest.display());
        return Ok(());
    }

    info!("Refreshing {} to {}", dest.display(), git_ref);
    git(dest).args(["fetch", "origin"]).run()?;
    git(dest).args(["fetch", "--tags", "origin"]).run()?;
    remove_pyc_files(dest)?;

    let remote_branch = format!("origin/{}", git_ref);
    if ref_exists(dest, &format!("refs/tags/{}", git_ref)) {
        git(dest).args(["checkout", git_ref]).run()
    } else if ref_exists(dest, &format!("refs/remotes/{}", remote_branch)) {
        if ref_exists(dest, &format!("refs/heads/{}", git_ref)) {
            git(dest).args(["checkout", git_ref]).run()?;
            git(dest).args(["reset", "--hard", remote_branch.as_str()]).run()
        } else {
            git(dest)
                .args(["checkout", "-b", git_ref, "-t", remote_branch.as_str()])
                .run()
        }
    } else if ref_exists(dest, &format!("refs/heads/{}", git_ref)) {
        git(dest).args(["checkout", git_ref]).run()
    } else {
        Err(StackError::GitRefNotFound {
            remote: remote.to_string(),
            git_ref: git_ref.to_string(),
        }
        .into())
    }
}
