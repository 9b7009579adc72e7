//! # StackRS Image Upload (`common::image`)
//!
//! File: cli/src/common/image.rs
//!
//! ## Overview
//!
//! Downloads a guest image into the files directory (once) and registers it
//! with the image service through the `glance` client. The format is picked
//! from the file name:
//!
//! | Name              | Handling                                                   |
//! |-------------------|------------------------------------------------------------|
//! | `*openvz*.tar.gz` | uploaded as-is, `ami` container and disk format            |
//! | `*.tar.gz`, `*.tgz` | unpacked; kernel and ramdisk uploaded first, image linked to them |
//! | `*.img`           | raw disk, bare container                                   |
//! | `*.img.gz`        | gunzipped next to the download, then raw/bare              |
//! | `*.qcow2`         | qcow2 disk, bare container                                 |
//!
//! Anything else is `StackError::UnsupportedImage`.
//!
use crate::common::process::CommandSpec;
use crate::core::error::{Result, StackError};
use anyhow::Context;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// How an image file is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageKind {
    /// OpenVZ template tarball, uploaded without unpacking.
    OpenVz { name: String },
    /// Tarball holding a kernel, an optional ramdisk and a machine image.
    Bundle { name: String },
    Raw { name: String },
    RawGz { name: String },
    Qcow2 { name: String },
}

impl ImageKind {
    /// Classifies `url` by its final path component.
    pub fn from_url(url: &str) -> Result<Self> {
        let file_name = image_file_name(url);
        let strip = |suffix: &str| file_name.strip_suffix(suffix).map(str::to_string);
        let kind = if let Some(name) = strip(".tar.gz") {
            if url.contains("openvz") {
                ImageKind::OpenVz { name }
            } else {
                ImageKind::Bundle { name }
            }
        } else if let Some(name) = strip(".tgz") {
            ImageKind::Bundle { name }
        } else if let Some(name) = strip(".img.gz") {
            ImageKind::RawGz { name }
        } else if let Some(name) = strip(".img") {
            ImageKind::Raw { name }
        } else if let Some(name) = strip(".qcow2") {
            ImageKind::Qcow2 { name }
        } else {
            return Err(StackError::UnsupportedImage(file_name.to_string()).into());
        };
        Ok(kind)
    }
}

/// Last path component of `url`.
pub fn image_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Field `index` of a `|`-delimited table row, counting the leading empty
/// field as 0. Negative indexes count from the end.
pub fn get_field(line: &str, index: isize) -> Option<String> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    let idx = if index < 0 {
        fields.len().checked_sub(index.unsigned_abs())?
    } else {
        index as usize
    };
    fields.get(idx).map(|f| f.to_string())
}

/// Pulls the `id` row out of `glance image-create` table output.
pub fn parse_image_id(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| get_field(line, 1).as_deref() == Some("id"))
        .and_then(|line| get_field(line, 2))
}

/// Files found in an unpacked bundle.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BundleParts {
    pub kernel: Option<PathBuf>,
    pub ramdisk: Option<PathBuf>,
    pub image: Option<PathBuf>,
}

fn parent_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_name().is_some_and(|n| n == "image")
        && path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix))
}

/// Locates kernel (`*-vmlinuz*`, `aki-*/image`), ramdisk (`*-initrd*`,
/// `ari-*/image`) and image (`*.img`, `ami-*/image`) under `dir`.
pub fn find_bundle_parts(dir: &Path) -> BundleParts {
    let mut parts = BundleParts::default();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        if parts.kernel.is_none() && (name.contains("-vmlinuz") || parent_starts_with(path, "aki-")) {
            parts.kernel = Some(path.to_path_buf());
        } else if parts.ramdisk.is_none()
            && (name.contains("-initrd") || parent_starts_with(path, "ari-"))
        {
            parts.ramdisk = Some(path.to_path_buf());
        } else if parts.image.is_none() && (name.ends_with(".img") || parent_starts_with(path, "ami-")) {
            parts.image = Some(path.to_path_buf());
        }
    }
    parts
}

/// Unpacks a gzipped tarball into a fresh `dest`.
pub fn extract_bundle(archive: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest)
            .with_context(|| format!("Failed to clear {}", dest.display()))?;
    }
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let file = File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    tar::Archive::new(GzDecoder::new(file))
        .unpack(dest)
        .with_context(|| format!("Failed to unpack {}", archive.display()))?;
    debug!("Unpacked {} into {}", archive.display(), dest.display());
    Ok(())
}

/// Gunzips `src` into `dest`.
pub fn gunzip_to(src: &Path, dest: &Path) -> Result<()> {
    let mut reader = GzDecoder::new(
        File::open(src).with_context(|| format!("Failed to open {}", src.display()))?,
    );
    let mut writer =
        File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Failed to decompress {}", src.display()))?;
    Ok(())
}

/// Image service endpoint, credentials and download policy.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    pub files_dir: PathBuf,
    pub glance_hostport: String,
    pub token: String,
    pub offline: bool,
}

impl ImageUploader {
    /// `glance image-create` reading the image from `file`.
    pub fn create_command(
        &self,
        name: &str,
        container_format: &str,
        disk_format: &str,
        properties: &[(&str, &str)],
        file: &Path,
    ) -> CommandSpec {
        let mut spec = CommandSpec::new("glance").args([
            "--os-auth-token",
            self.token.as_str(),
            "--os-image-url",
            format!("http://{}", self.glance_hostport).as_str(),
            "image-create",
            "--name",
            name,
            "--public",
            "--container-format",
            container_format,
            "--disk-format",
            disk_format,
        ]);
        for (key, value) in properties {
            spec = spec.arg("--property").arg(format!("{}={}", key, value));
        }
        spec.stdin_file(file)
    }

    /// Downloads `url` into the files directory unless already there.
    pub fn fetch(&self, url: &str) -> Result<PathBuf> {
        let path = self.files_dir.join(image_file_name(url));
        let cached = fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        if cached {
            debug!("Using cached image {}", path.display());
            return Ok(path);
        }
        if self.offline {
            return Err(StackError::FileSystem(format!(
                "offline and {} is not cached",
                path.display()
            ))
            .into());
        }
        info!("Downloading {}", url);
        CommandSpec::new("wget")
            .args(["-c", url, "-O"])
            .arg(path.to_string_lossy())
            .run()?;
        Ok(path)
    }

    fn create_and_get_id(&self, name: &str, format: &str, file: &Path) -> Result<String> {
        let output = self.create_command(name, format, format, &[], file).output()?;
        parse_image_id(&output).ok_or_else(|| {
            anyhow::anyhow!("no image id in glance output for '{}':\n{}", name, output)
        })
    }

    /// Fetches and registers the image at `url`.
    pub fn upload_image(&self, url: &str) -> Result<()> {
        let kind = ImageKind::from_url(url)?;
        let path = self.fetch(url)?;
        info!("Uploading {} as {:?}", path.display(), kind);
        match kind {
            ImageKind::OpenVz { name } => self.create_command(&name, "ami", "ami", &[], &path).run(),
            ImageKind::Raw { name } => self.create_command(&name, "bare", "raw", &[], &path).run(),
            ImageKind::Qcow2 { name } => {
                self.create_command(&name, "bare", "qcow2", &[], &path).run()
            }
            ImageKind::RawGz { name } => {
                let unpacked = self.files_dir.join(format!("{}.img", name));
                gunzip_to(&path, &unpacked)?;
                self.create_command(&name, "bare", "raw", &[], &unpacked).run()
            }
            ImageKind::Bundle { name } => {
                let xdir = self.files_dir.join("images").join(&name);
                extract_bundle(&path, &xdir)?;
                let parts = find_bundle_parts(&xdir);
                let image = parts.image.ok_or_else(|| {
                    StackError::UnsupportedImage(format!("no machine image inside {}", path.display()))
                })?;
                let kernel_id = parts
                    .kernel
                    .map(|k| self.create_and_get_id(&format!("{}-kernel", name), "aki", &k))
                    .transpose()?;
                let ramdisk_id = parts
                    .ramdisk
                    .map(|r| self.create_and_get_id(&format!("{}-ramdisk", name), "ari", &r))
                    .transpose()?;
                let mut properties = Vec::new();
                if let Some(id) = kernel_id.as_deref() {
                    properties.push(("kernel_id", id));
                }
                if let Some(id) = ramdisk_id.as_deref() {
                    properties.push(("ramdisk_id", id));
                }
                let image_name = name.strip_suffix(".img").unwrap_or(&name);
                self.create_command(image_name, "ami", "ami", &properties, &image)
                    .run()
            }
        }
    }
}
