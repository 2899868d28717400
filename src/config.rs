//! Environment-backed configuration.
//!
//! Every setting resolves CLI flag > environment variable > default. The two
//! superuser values mirror what the container runtime hands the entrypoint.

use std::fmt;

/// Base URL of the backend API.
pub const ENV_BASE_URL: &str = "PB_URL";
/// Superuser account identifier (email).
pub const ENV_SUPERUSER_EMAIL: &str = "PB_SUPERUSER_EMAIL";
/// Superuser account secret.
pub const ENV_SUPERUSER_PASSWORD: &str = "PB_SUPERUSER_PASSWORD";
/// Path to the backend server binary.
pub const ENV_BACKEND_BINARY: &str = "PB_BINARY";
/// Listen address handed to the backend's serve command.
pub const ENV_HTTP_ADDR: &str = "PB_HTTP_ADDR";
/// Optional `pb_auth` cookie used to resume an existing auth session.
pub const ENV_AUTH_COOKIE: &str = "PB_AUTH_COOKIE";

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8090";
/// Default backend binary name, resolved through `PATH`.
pub const DEFAULT_BACKEND_BINARY: &str = "pocketbase";
/// Default listen address for the serve command.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8090";

/// The bootstrap account identity and secret.
///
/// The password is redacted in Debug output.
#[derive(Clone)]
pub struct SuperuserCredentials {
    /// Account email.
    pub email: String,
    password: String,
}

impl SuperuserCredentials {
    /// Creates credentials from explicit values.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Reads credentials from the environment.
    ///
    /// Returns `None` unless both variables are set and non-empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let email = env_value(ENV_SUPERUSER_EMAIL)?;
        let password = env_value(ENV_SUPERUSER_PASSWORD)?;
        Some(Self { email, password })
    }

    /// Returns the account secret.
    ///
    /// The value is sensitive — avoid logging the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for SuperuserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperuserCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Reads a trimmed, non-empty environment value.
#[must_use]
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolves a setting: CLI flag > environment variable > default.
#[must_use]
pub fn resolve(cli_value: Option<String>, env_var: &str, default: &str) -> String {
    cli_value
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env_value(env_var))
        .unwrap_or_else(|| default.to_string())
}

/// Resolves an optional setting: CLI flag > environment variable > absent.
#[must_use]
pub fn resolve_optional(cli_value: Option<String>, env_var: &str) -> Option<String> {
    cli_value
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env_value(env_var))
}
