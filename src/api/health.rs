//! Backend readiness probing with exponential backoff.
//!
//! The seeder runs right after the backend process starts; the first requests
//! race its listener coming up. [`wait_until_ready`] polls the health route,
//! retrying transient failures with exponential backoff and jitter, and gives
//! up early on failures a retry cannot fix.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::client::{ApiClient, handle_json_response};
use super::error::ApiError;

/// Default maximum readiness attempts.
pub const DEFAULT_READY_ATTEMPTS: u32 = 20;

/// Base delay before the first retry.
const BASE_DELAY: Duration = Duration::from_millis(250);

/// Cap on the backoff delay.
const MAX_DELAY: Duration = Duration::from_secs(5);

/// Backoff multiplier (doubles each attempt).
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Maximum jitter added to each delay.
const MAX_JITTER: Duration = Duration::from_millis(100);

/// Health route response body.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    /// Status code the backend reports (the health route uses `code`).
    #[serde(default)]
    pub code: u16,
    /// Human-readable health message.
    pub message: String,
}

/// Readiness polling configuration.
#[derive(Debug, Clone)]
pub struct ReadinessPolicy {
    max_attempts: u32,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_READY_ATTEMPTS,
        }
    }
}

impl ReadinessPolicy {
    /// Creates a policy with a custom attempt budget (minimum 1).
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns the configured attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the retry following `attempt` (1-indexed), with jitter.
    ///
    /// Formula: `min(base * multiplier^(attempt-1), cap) + jitter`.
    fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = (BASE_DELAY.as_millis() as f64) * BACKOFF_MULTIPLIER.powf(exponent);
        let capped_ms = delay_ms.min(MAX_DELAY.as_millis() as f64);

        let jitter_ms = rand::thread_rng().gen_range(0..=MAX_JITTER.as_millis() as u64);
        Duration::from_millis(capped_ms as u64) + Duration::from_millis(jitter_ms)
    }
}

impl ApiClient {
    /// Queries the backend health route once.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, an error status, or an
    /// undecodable body.
    #[instrument(level = "debug", skip(self), fields(base_url = %self.base_url()))]
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = format!("{}/api/health", self.base_url());
        let request = self.core.http.get(&url);
        let response = self.core.send(request, &url).await?;
        handle_json_response(&url, response).await
    }
}

/// Polls the health route until the backend answers or attempts run out.
///
/// Transient failures (connect errors, timeouts, 5xx, 429) are retried with
/// exponential backoff; other backend errors abort immediately — the server
/// is reachable but the route is wrong, so retrying cannot help.
///
/// # Errors
///
/// Returns [`ApiError::NotReady`] wrapping the last probe failure when the
/// attempt budget is exhausted, or the failure itself when it is not
/// retryable.
#[instrument(skip(client, policy), fields(base_url = %client.base_url(), max_attempts = policy.max_attempts()))]
pub async fn wait_until_ready(
    client: &ApiClient,
    policy: &ReadinessPolicy,
) -> Result<HealthStatus, ApiError> {
    let mut attempt = 1u32;
    loop {
        match client.health().await {
            Ok(status) => {
                debug!(attempt, message = %status.message, "backend is ready");
                return Ok(status);
            }
            Err(error) if !is_retryable(&error) => {
                warn!(attempt, %error, "readiness probe hit a non-retryable failure");
                return Err(error);
            }
            Err(error) => {
                if attempt >= policy.max_attempts() {
                    return Err(ApiError::not_ready(client.base_url(), attempt, error));
                }
                let delay = policy.delay_after(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, %error, "backend not ready yet");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// True for failures where waiting longer may help.
fn is_retryable(error: &ApiError) -> bool {
    match error {
        ApiError::Network { .. } | ApiError::Timeout { .. } => true,
        ApiError::Backend { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}
