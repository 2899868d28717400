//! pbseed Core Library
//!
//! This library backs the `pbseed` tool, which bootstraps a PocketBase-style
//! backend and seeds demo data through its REST API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - REST client, per-collection services, readiness probing
//! - [`auth`] - Cookie header decoding, `pb_auth` codec, auth store
//! - [`seed`] - Demo fixtures, idempotent apply, validation
//! - [`commands`] - CLI command handlers
//! - [`config`] - Environment-backed configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod seed;

// Re-export commonly used types
pub use api::{
    ApiClient, ApiError, HealthStatus, ListOptions, ListResponse, ReadinessPolicy, RecordService,
    ViewOptions, wait_until_ready,
};
pub use auth::{
    AUTH_COOKIE_NAME, AuthCookiePayload, AuthRecord, AuthStore, export_auth_cookie,
    import_auth_cookie, parse_cookie_header,
};
pub use config::SuperuserCredentials;
pub use seed::{SeedError, SeedOutcome, run_seed};
