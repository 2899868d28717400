//! Seed command handler: build a client and run the seed plan.

use anyhow::Result;

use crate::api::{ApiClient, ReadinessPolicy};
use crate::config::SuperuserCredentials;
use crate::seed::{SeedOutcome, run_seed};

/// Seeds the demo dataset against the backend at `base_url`.
///
/// Credentials come from the environment; an optional `pb_auth` cookie
/// short-circuits password auth when it is still valid.
///
/// # Errors
///
/// Returns an error when the backend never becomes ready, authentication
/// fails, a request errors, or validation finds the seeded data incomplete.
pub async fn run_seed_command(
    base_url: &str,
    ready_attempts: u32,
    auth_cookie: Option<&str>,
) -> Result<SeedOutcome> {
    let client = ApiClient::new(base_url)?;
    let credentials = SuperuserCredentials::from_env();
    let readiness = ReadinessPolicy::with_max_attempts(ready_attempts);

    let outcome = run_seed(&client, credentials.as_ref(), auth_cookie, &readiness).await?;
    Ok(outcome)
}
