//! # StackRS OS Command
//!
//! File: cli/src/commands/os.rs
//!
//! Implements `stackrs os`: prints the detected OS descriptor and distro tag.
//!
//! ```bash
//! stackrs os
//! stackrs os --tag            # just "precise", "f17", ...
//! stackrs os --rootwrap nova  # /usr/local/bin/nova-rootwrap on Ubuntu
//! ```
//!
use crate::common::system::{self, installer};
use crate::core::error::Result;
use crate::core::os::OsDescriptor;
use clap::Parser;

/// Arguments for the 'os' command.
#[derive(Parser, Debug)]
pub struct OsArgs {
    /// Print only the distro tag.
    #[arg(long, conflicts_with = "rootwrap")]
    tag: bool,
    /// Print the rootwrap location for the given project (e.g. nova, cinder).
    #[arg(long, value_name = "MODULE")]
    rootwrap: Option<String>,
}

fn describe(os: &OsDescriptor) -> String {
    let package = os
        .package
        .map(|p| p.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "vendor:   {}\nrelease:  {}\nupdate:   {}\npackage:  {}\ncodename: {}\ndistro:   {}",
        os.vendor,
        os.release,
        os.update,
        package,
        os.codename,
        os.distro_tag()
    )
}

/// Handler for 'stackrs os'.
pub async fn handle_os(args: OsArgs) -> Result<()> {
    let os = system::host_os();
    if args.tag {
        println!("{}", os.distro_tag());
    } else if let Some(module) = args.rootwrap {
        println!("{}", installer::rootwrap_location(os, &module));
    } else {
        println!("{}", describe(os));
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::os::PackageFamily;

    #[test]
    fn test_describe() {
        let os = OsDescriptor {
            vendor: "Ubuntu".into(),
            release: "12.04".into(),
            update: String::new(),
            package: Some(PackageFamily::Deb),
            codename: "precise".into(),
        };
        let text = describe(&os);
        assert!(text.contains("package:  deb"));
        assert!(text.ends_with("distro:   precise"));
    }

    #[test]
    fn test_os_args_conflict() {
        assert!(OsArgs::try_parse_from(["os", "--tag", "--rootwrap", "nova"]).is_err());
    }
}
