//! CLI argument definitions using clap derive macros.

use clap::{Parser, Subcommand};

use pbseed_core::api::DEFAULT_READY_ATTEMPTS;

/// Bootstrap a PocketBase-style backend and seed demo data.
///
/// pbseed wraps the backend binary for container entrypoints (superuser
/// bootstrap + serve) and seeds/validates a demo dataset through the
/// backend's REST API.
#[derive(Parser, Debug)]
#[command(name = "pbseed")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bootstrap the superuser account and start the backend server
    Serve {
        /// Path to the backend binary (falls back to $PB_BINARY, then PATH)
        #[arg(long)]
        binary: Option<String>,

        /// Listen address passed to the backend (falls back to $PB_HTTP_ADDR)
        #[arg(long)]
        http: Option<String>,
    },

    /// Seed and validate the demo dataset through the REST API
    Seed {
        /// Backend base URL (falls back to $PB_URL)
        #[arg(long)]
        url: Option<String>,

        /// pb_auth cookie to resume an existing session (falls back to $PB_AUTH_COOKIE)
        #[arg(long)]
        auth_cookie: Option<String>,

        /// Maximum readiness attempts before giving up (1-100)
        #[arg(long, default_value_t = DEFAULT_READY_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=100))]
        attempts: u32,
    },

    /// Query the backend health route once
    Check {
        /// Backend base URL (falls back to $PB_URL)
        #[arg(long)]
        url: Option<String>,
    },
}
