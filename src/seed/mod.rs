//! Demo-data seeding and validation.
//!
//! The seeder is idempotent: every fixture is looked up by its natural key
//! first and only created when absent, so re-running against an already
//! seeded backend is a no-op. After applying, the seeded collection is read
//! back and the auth-cookie round trip is checked.

mod fixtures;

pub use fixtures::{DEMO_COLLECTION, DemoPost, FIXTURES, Fixture, collection_schema};

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{
    ApiClient, ApiError, CollectionModel, ReadinessPolicy, ViewOptions, wait_until_ready,
};
use crate::auth::{AuthRecord, SUPERUSERS_COLLECTION, import_auth_cookie};
use crate::config::SuperuserCredentials;

/// Counters reported after a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Records created by this run.
    pub created: usize,
    /// Records that already existed and were left untouched.
    pub skipped: usize,
    /// Records confirmed present during validation.
    pub verified: usize,
}

/// Errors produced by the seeder.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The seeded data did not read back as expected.
    #[error("seed validation failed: {reason}")]
    Validation {
        /// What did not match.
        reason: String,
    },

    /// No usable auth cookie and no credentials to fall back to.
    #[error("superuser credentials missing: set PB_SUPERUSER_EMAIL and PB_SUPERUSER_PASSWORD")]
    MissingCredentials,
}

impl SeedError {
    fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}

/// Seeds the demo dataset and validates it.
///
/// Waits for backend readiness, authenticates (cookie resume first, password
/// fallback), ensures the demo collection exists, upserts every fixture, and
/// validates the result.
///
/// # Errors
///
/// Returns [`SeedError`] when the backend stays unreachable, authentication
/// fails, a request errors, or validation finds the data incomplete.
#[instrument(skip_all, fields(base_url = %client.base_url()))]
pub async fn run_seed(
    client: &ApiClient,
    credentials: Option<&SuperuserCredentials>,
    auth_cookie: Option<&str>,
    readiness: &ReadinessPolicy,
) -> Result<SeedOutcome, SeedError> {
    let health = wait_until_ready(client, readiness).await?;
    debug!(message = %health.message, "backend ready");

    authenticate(client, credentials, auth_cookie).await?;
    ensure_demo_collection(client).await?;

    let mut outcome = apply_fixtures(client).await?;
    outcome.verified = validate_seed(client).await?;

    info!(
        created = outcome.created,
        skipped = outcome.skipped,
        verified = outcome.verified,
        "seed complete"
    );
    Ok(outcome)
}

/// Authenticates the client as a superuser.
///
/// An operator-supplied `pb_auth` cookie is tried first: its token is
/// adopted and the record hydrated by id. A stale or undecodable cookie is
/// not an error — it falls back to password authentication.
async fn authenticate(
    client: &ApiClient,
    credentials: Option<&SuperuserCredentials>,
    auth_cookie: Option<&str>,
) -> Result<(), SeedError> {
    if let Some(header) = auth_cookie {
        match import_auth_cookie(header) {
            Some(payload) if !payload.record_id.is_empty() => {
                client.set_token(payload.token);
                let lookup = client
                    .collection(SUPERUSERS_COLLECTION)
                    .get_one::<AuthRecord>(&payload.record_id, &ViewOptions::default())
                    .await;
                match lookup {
                    Ok(record) => {
                        client.set_auth_record(record);
                        info!("resumed auth from pb_auth cookie");
                        return Ok(());
                    }
                    Err(error) => {
                        warn!(%error, "auth cookie rejected by backend; falling back to password auth");
                        client.clear_auth();
                    }
                }
            }
            Some(_) => {
                warn!("auth cookie carries no record id; falling back to password auth");
            }
            None => {
                warn!("could not decode pb_auth cookie; falling back to password auth");
            }
        }
    }

    let Some(credentials) = credentials else {
        return Err(SeedError::MissingCredentials);
    };
    client
        .collection(SUPERUSERS_COLLECTION)
        .auth_with_password(&credentials.email, credentials.password())
        .await?;
    info!(email = %credentials.email, "authenticated as superuser");
    Ok(())
}

/// Creates the demo collection when it does not exist yet.
async fn ensure_demo_collection(client: &ApiClient) -> Result<(), SeedError> {
    match client.collections().get_one(DEMO_COLLECTION).await {
        Ok(existing) => {
            debug!(collection = %existing.name, "demo collection already exists");
            Ok(())
        }
        Err(error) if error.is_not_found() => {
            let created: CollectionModel = client.collections().create(&collection_schema()).await?;
            info!(collection = %created.name, id = %created.id, "created demo collection");
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}

/// Upserts every fixture, creating only the ones that are absent.
async fn apply_fixtures(client: &ApiClient) -> Result<SeedOutcome, SeedError> {
    let records = client.collection(DEMO_COLLECTION);
    let mut outcome = SeedOutcome::default();

    for fixture in FIXTURES {
        let existing = records
            .get_first_list_item::<DemoPost>(&fixture.filter())
            .await;
        match existing {
            Ok(post) => {
                debug!(slug = %post.slug, id = %post.id, "fixture already present");
                outcome.skipped += 1;
            }
            Err(error) if error.is_not_found() => {
                let created: DemoPost = records.create(&fixture.to_record()).await?;
                info!(slug = %created.slug, id = %created.id, "created fixture record");
                outcome.created += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(outcome)
}

/// Reads the seeded data back and checks the auth-cookie round trip.
///
/// Returns the number of fixture records confirmed present.
async fn validate_seed(client: &ApiClient) -> Result<usize, SeedError> {
    let posts: Vec<DemoPost> = client.collection(DEMO_COLLECTION).get_full_list().await?;
    let present: HashSet<&str> = posts.iter().map(|post| post.slug.as_str()).collect();

    for fixture in FIXTURES {
        if !present.contains(fixture.slug) {
            return Err(SeedError::validation(format!(
                "record '{}' missing from collection '{DEMO_COLLECTION}' after seeding",
                fixture.slug
            )));
        }
    }

    // The exported cookie must decode back to the live token; this exercises
    // the same decoder the seeding consumers rely on.
    let cookie = client
        .export_auth_cookie()
        .ok_or_else(|| SeedError::validation("auth store incomplete after seeding"))?;
    let payload = import_auth_cookie(&cookie)
        .ok_or_else(|| SeedError::validation("exported pb_auth cookie did not decode"))?;
    if Some(payload.token) != client.auth_token() {
        return Err(SeedError::validation(
            "pb_auth cookie round trip returned a different token",
        ));
    }

    Ok(FIXTURES.len())
}
