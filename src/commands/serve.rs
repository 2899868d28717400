//! Entrypoint command: bootstrap the superuser account, then start the
//! backend server. Both steps invoke the external backend binary.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::SuperuserCredentials;

/// Runs the entrypoint flow and returns the server's exit code.
///
/// When credentials are present, `<binary> superuser upsert <email> <secret>`
/// runs to completion first; a non-zero exit aborts the start. The server is
/// then launched with `<binary> serve --http <addr>` and awaited until it
/// exits.
///
/// # Errors
///
/// Returns an error when either child process cannot be launched or the
/// upsert step fails. The secret never appears in error messages or logs.
pub async fn run_serve_command(
    binary: &Path,
    http_addr: &str,
    credentials: Option<&SuperuserCredentials>,
) -> Result<i32> {
    if let Some(credentials) = credentials {
        info!(email = %credentials.email, "upserting superuser account");
        let status = Command::new(binary)
            .arg("superuser")
            .arg("upsert")
            .arg(&credentials.email)
            .arg(credentials.password())
            .status()
            .await
            .with_context(|| {
                format!("failed to launch backend binary '{}'", binary.display())
            })?;
        if !status.success() {
            bail!("superuser upsert exited with {status}");
        }
    } else {
        warn!("superuser credentials not set; skipping account bootstrap");
    }

    info!(binary = %binary.display(), addr = http_addr, "starting backend server");
    let status = Command::new(binary)
        .arg("serve")
        .arg("--http")
        .arg(http_addr)
        .status()
        .await
        .with_context(|| format!("failed to launch backend binary '{}'", binary.display()))?;

    // A missing exit code means the server died to a signal.
    Ok(status.code().unwrap_or(1))
}
