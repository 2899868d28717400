//! Check command handler: one-shot backend health query.

use anyhow::Result;

use crate::api::ApiClient;
use tracing::info;

/// Queries the backend health route once and logs the answer.
///
/// # Errors
///
/// Returns an error when the backend is unreachable or unhealthy.
pub async fn run_check_command(base_url: &str) -> Result<()> {
    let client = ApiClient::new(base_url)?;
    let health = client.health().await?;
    info!(code = health.code, message = %health.message, "backend is healthy");
    Ok(())
}
