//! # StackRS Screen Supervision (`common::screen`)
//!
//! File: cli/src/common/screen.rs
//!
//! Each enabled service runs in its own window of a shared `screen` session:
//! a window titled after the service is opened, then the command is typed
//! into it. Services that are not enabled are skipped.
//!
use crate::common::process::CommandSpec;
use crate::core::error::Result;
use crate::core::services::ServiceSet;
use tracing::{debug, info};

/// The two screen invocations that start `command` in a window for `service`.
pub fn screen_commands(session: &str, service: &str, command: &str) -> [CommandSpec; 2] {
    [
        CommandSpec::new("screen").args(["-S", session, "-X", "screen", "-t", service]),
        // \r submits the line inside the window.
        CommandSpec::new("screen").args([
            "-S",
            session,
            "-p",
            service,
            "-X",
            "stuff",
            format!("{}\r", command).as_str(),
        ]),
    ]
}

/// Starts `command` for `service` if it is enabled. Returns whether it ran.
pub fn screen_it(services: &ServiceSet, session: &str, service: &str, command: &str) -> Result<bool> {
    if !services.contains(service) {
        debug!("{} is not enabled, not starting it", service);
        return Ok(false);
    }
    info!("Starting {} in screen session '{}'", service, session);
    for spec in screen_commands(session, service, command) {
        spec.run()?;
    }
    Ok(true)
}
