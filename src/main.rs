//! CLI entry point for the pbseed tool.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use pbseed_core::commands::{run_check_command, run_seed_command, run_serve_command};
use pbseed_core::config::{self, SuperuserCredentials};
use tracing::{debug, info};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Cli::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match args.command {
        Command::Serve { binary, http } => {
            let binary = config::resolve(
                binary,
                config::ENV_BACKEND_BINARY,
                config::DEFAULT_BACKEND_BINARY,
            );
            let http_addr = config::resolve(http, config::ENV_HTTP_ADDR, config::DEFAULT_HTTP_ADDR);
            let credentials = SuperuserCredentials::from_env();

            let code = run_serve_command(Path::new(&binary), &http_addr, credentials.as_ref()).await?;
            if code != 0 {
                // Propagate the backend's exit code to the container runtime.
                std::process::exit(code);
            }
        }
        Command::Seed {
            url,
            auth_cookie,
            attempts,
        } => {
            let base_url = config::resolve(url, config::ENV_BASE_URL, config::DEFAULT_BASE_URL);
            let auth_cookie = config::resolve_optional(auth_cookie, config::ENV_AUTH_COOKIE);

            let outcome = run_seed_command(&base_url, attempts, auth_cookie.as_deref()).await?;
            info!(
                created = outcome.created,
                skipped = outcome.skipped,
                verified = outcome.verified,
                "Seeding finished"
            );
        }
        Command::Check { url } => {
            let base_url = config::resolve(url, config::ENV_BASE_URL, config::DEFAULT_BASE_URL);
            run_check_command(&base_url).await?;
        }
    }

    Ok(())
}
