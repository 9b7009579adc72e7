//! # StackRS INI Command
//!
//! File: cli/src/commands/ini.rs
//!
//! Implements `stackrs ini`, a command-line front for `common::ini`.
//!
//! ```bash
//! stackrs ini set /etc/nova/nova.conf DEFAULT verbose True
//! stackrs ini get /etc/nova/nova.conf DEFAULT verbose
//! stackrs ini comment /etc/glance/glance-api.conf paste_deploy flavor
//! ```
//!
use crate::common::ini;
use crate::core::error::Result;
use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Arguments for the 'ini' command group.
#[derive(Parser, Debug)]
pub struct IniArgs {
    #[command(subcommand)]
    command: IniCommand,
}

/// File, section and option shared by every subcommand.
#[derive(Args, Debug)]
struct IniTarget {
    file: PathBuf,
    section: String,
    option: String,
}

#[derive(Subcommand, Debug)]
enum IniCommand {
    /// Print the value of an option (fails if it is not set)
    Get(IniTarget),
    /// Set an option, creating the section if needed
    Set {
        #[command(flatten)]
        target: IniTarget,
        value: String,
    },
    /// Comment an option out
    Comment(IniTarget),
    /// Restore a commented-out option
    Uncomment(IniTarget),
}

/// Handler for 'stackrs ini'.
pub async fn handle_ini(args: IniArgs) -> Result<()> {
    match args.command {
        IniCommand::Get(t) => match ini::ini_get(&t.file, &t.section, &t.option)? {
            Some(value) => println!("{}", value),
            None => bail!(
                "'{}' is not set in section [{}] of {}",
                t.option,
                t.section,
                t.file.display()
            ),
        },
        IniCommand::Set { target: t, value } => {
            ini::ini_set(&t.file, &t.section, &t.option, &value)?
        }
        IniCommand::Comment(t) => ini::ini_comment(&t.file, &t.section, &t.option)?,
        IniCommand::Uncomment(t) => ini::ini_uncomment(&t.file, &t.section, &t.option)?,
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_then_get_missing() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("glance-api.conf");
        let file_arg = file.to_string_lossy().to_string();

        let set = IniArgs::try_parse_from(["ini", "set", &file_arg, "DEFAULT", "debug", "True"])
            .unwrap();
        handle_ini(set).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "[DEFAULT]\ndebug = True\n"
        );

        let get = IniArgs::try_parse_from(["ini", "get", &file_arg, "DEFAULT", "verbose"]).unwrap();
        let err = handle_ini(get).await.unwrap_err();
        assert!(err.to_string().contains("'verbose' is not set"));
    }
}
