//! HTTP client wrapper for the backend REST API.
//!
//! This module provides the [`ApiClient`] struct which owns the underlying
//! HTTP client, the validated base URL, and the shared auth store, and hands
//! out per-collection services.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::collections::CollectionService;
use super::error::{ApiError, ErrorBody};
use super::records::RecordService;
use crate::auth::{AuthRecord, AuthStore, export_auth_cookie};

/// Connect timeout for backend requests (seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout for backend requests (seconds). Responses are small JSON.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for a backend instance.
///
/// Designed to be created once and reused; clones share the HTTP connection
/// pool and the auth store.
///
/// # Example
///
/// ```no_run
/// use pbseed_core::api::ApiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("http://127.0.0.1:8090")?;
/// let health = client.health().await?;
/// println!("backend says: {}", health.message);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) core: Arc<ClientCore>,
}

#[derive(Debug)]
pub(crate) struct ClientCore {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    auth: RwLock<AuthStore>,
}

impl ApiClient {
    /// Creates a client for the given base URL with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] when the URL does not parse, is
    /// not http/https, or has no host.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] for an unusable base URL.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(request_timeout_secs))
            .user_agent(concat!("pbseed/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client with static configuration");

        Ok(Self {
            core: Arc::new(ClientCore {
                http,
                base_url,
                auth: RwLock::new(AuthStore::default()),
            }),
        })
    }

    /// Returns the normalized base URL (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.core.base_url
    }

    /// Returns the record service for a collection.
    #[must_use]
    pub fn collection(&self, name: impl Into<String>) -> RecordService {
        RecordService::new(Arc::clone(&self.core), name.into())
    }

    /// Returns the service managing collections themselves.
    #[must_use]
    pub fn collections(&self) -> CollectionService {
        CollectionService::new(Arc::clone(&self.core))
    }

    /// Returns the current bearer token, if any.
    ///
    /// The token is sensitive — avoid logging the return value.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.core.read_auth().token().map(str::to_string)
    }

    /// Returns a copy of the authenticated record, if any.
    #[must_use]
    pub fn auth_record(&self) -> Option<AuthRecord> {
        self.core.read_auth().record().cloned()
    }

    /// True when the stored auth state belongs to a superuser.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.core.read_auth().is_superuser()
    }

    /// Stores a bearer token alone, e.g. one imported from a `pb_auth` cookie.
    pub fn set_token(&self, token: String) {
        self.core.write_auth().set_token(token);
    }

    /// Attaches the authenticated record to the current token.
    pub fn set_auth_record(&self, record: AuthRecord) {
        self.core.write_auth().set_record(record);
    }

    /// Drops all stored auth state.
    pub fn clear_auth(&self) {
        self.core.write_auth().clear();
    }

    /// Exports the current auth state as a `pb_auth` cookie pair.
    ///
    /// Returns `None` until both a token and a record are stored.
    #[must_use]
    pub fn export_auth_cookie(&self) -> Option<String> {
        let store = self.core.read_auth();
        let token = store.token()?;
        let record = store.record()?;
        Some(export_auth_cookie(token, &record.id))
    }
}

impl ClientCore {
    pub(crate) fn read_auth(&self) -> RwLockReadGuard<'_, AuthStore> {
        self.auth.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_auth(&self) -> RwLockWriteGuard<'_, AuthStore> {
        self.auth.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builds the `Authorization` header map from the auth store.
    pub(crate) fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.read_auth().token()
            && let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}"))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// Sends a request, classifying transport failures.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|error| ApiError::request(url, error))
    }
}

/// Reads a response body, decoding either the expected shape or the
/// backend's error payload.
#[instrument(level = "debug", skip(response))]
pub(crate) async fn handle_json_response<T: DeserializeOwned>(
    url: &str,
    response: Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|error| ApiError::request(url, error))?;

    if !status.is_success() {
        debug!(%status, "backend returned error status");
        return Err(backend_error(url, status, &body));
    }

    serde_json::from_str(&body).map_err(|error| ApiError::decode(url, error))
}

/// Reads a response whose success body is empty (e.g. record deletion).
pub(crate) async fn handle_empty_response(url: &str, response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response
        .text()
        .await
        .map_err(|error| ApiError::request(url, error))?;
    Err(backend_error(url, status, &body))
}

/// Maps an error response to [`ApiError::Backend`], preferring the backend's
/// own error payload over the transport status line.
fn backend_error(url: &str, status: reqwest::StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error_body) => ApiError::backend(url, error_body.status, error_body.message),
        Err(_) => ApiError::backend(
            url,
            status.as_u16(),
            status.canonical_reason().unwrap_or("request failed"),
        ),
    }
}

/// Validates and normalizes a base URL: http/https, host present,
/// trailing slash removed.
fn validate_base_url(base_url: &str) -> Result<String, ApiError> {
    let trimmed = base_url.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|error| ApiError::invalid_base_url(trimmed, error.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::invalid_base_url(
            trimmed,
            "scheme must be http or https",
        ));
    }
    if parsed.host_str().is_none() {
        return Err(ApiError::invalid_base_url(trimmed, "missing host"));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
