//! # StackRS Image Command
//!
//! File: cli/src/commands/image.rs
//!
//! Implements `stackrs image`: downloads a guest image (or reuses the cached
//! copy in the files directory) and registers it with the image service.
//!
//! ```bash
//! export OS_AUTH_TOKEN=...
//! stackrs image http://download.cirros-cloud.net/0.3.0/cirros-0.3.0-x86_64-uec.tar.gz
//! stackrs image --files-dir ~/devstack/files http://example.com/precise.qcow2
//! ```
//!
use crate::common::image::ImageUploader;
use crate::core::config;
use crate::core::error::{Result, StackError};
use clap::Parser;
use std::path::PathBuf;

/// Arguments for the 'image' command.
#[derive(Parser, Debug)]
pub struct ImageArgs {
    /// Image URL (.tar.gz bundle, openvz .tar.gz, .img, .img.gz or .qcow2).
    url: String,
    /// Auth token for the image service.
    #[arg(long, env = "OS_AUTH_TOKEN", hide_env_values = true)]
    token: String,
    /// Download cache. Defaults to `stack.files_dir`.
    #[arg(long)]
    files_dir: Option<PathBuf>,
    /// `host:port` of the image API. Defaults to `images.glance_hostport`.
    #[arg(long)]
    glance_hostport: Option<String>,
    /// Only use images already in the files directory.
    #[arg(long)]
    offline: bool,
}

/// Handler for 'stackrs image'.
pub async fn handle_image(args: ImageArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let files_dir = args
        .files_dir
        .or_else(|| cfg.stack.files_dir.as_ref().map(PathBuf::from))
        .ok_or_else(|| StackError::InvalidInput("no files directory configured".to_string()))?;
    if !files_dir.is_dir() {
        return Err(StackError::InvalidInput(format!(
            "files directory {} does not exist",
            files_dir.display()
        ))
        .into());
    }

    let uploader = ImageUploader {
        files_dir,
        glance_hostport: args.glance_hostport.unwrap_or(cfg.images.glance_hostport),
        token: args.token,
        offline: args.offline || cfg.stack.is_offline(),
    };
    uploader.upload_image(&args.url)
}
