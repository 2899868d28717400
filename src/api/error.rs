//! Error types for the API client.
//!
//! Every variant carries the request URL (or base URL) so failures point at
//! the exact route that misbehaved. Bodies and credentials are never included.

use thiserror::Error;

/// Error payload returned by the backend on failed requests.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ErrorBody {
    /// HTTP status the backend reports for the failure.
    pub status: u16,
    /// Human-readable message from the backend.
    pub message: String,
}

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS resolution, connection refused, TLS, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The backend answered with an error payload.
    #[error("backend returned {status} for {url}: {message}")]
    Backend {
        /// The URL that returned the error.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The backend's error message.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        /// The URL whose response failed to decode.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not usable.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL string.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The backend never became ready within the readiness policy.
    #[error("backend at {url} not ready after {attempts} attempts: {source}")]
    NotReady {
        /// The probed base URL.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    /// Creates a network error, promoting reqwest timeouts to [`ApiError::Timeout`].
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates a backend error from a decoded error body.
    pub fn backend(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid base URL error.
    pub fn invalid_base_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a readiness-exhausted error wrapping the last probe failure.
    pub fn not_ready(url: impl Into<String>, attempts: u32, source: ApiError) -> Self {
        Self::NotReady {
            url: url.into(),
            attempts,
            source: Box::new(source),
        }
    }

    /// The HTTP status reported by the backend, when this is a backend error.
    #[must_use]
    pub fn backend_status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a backend 404 — the looked-up resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.backend_status() == Some(404)
    }
}

// No `From<reqwest::Error>`: variants need the request URL for context, which
// the source error does not reliably provide. Callers go through the helper
// constructors instead.
