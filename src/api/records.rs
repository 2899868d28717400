//! Record CRUD and password authentication for a single collection.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use urlencoding::encode;

use super::client::{ClientCore, handle_empty_response, handle_json_response};
use super::error::ApiError;
use super::options::{ListOptions, ViewOptions};
use crate::auth::AuthRecord;

/// Page size used when fetching a full list.
pub const FULL_LIST_PAGE_SIZE: u64 = 200;

/// One page of records as returned by the list route.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    /// The records in this page.
    pub items: Vec<T>,
    /// The page number, starting at 1.
    pub page: u64,
    /// The page size the backend applied.
    pub per_page: u64,
    /// Total records matching the query; -1 when the count was skipped.
    #[serde(default = "total_skipped")]
    pub total_items: i64,
    /// Total pages; -1 when the count was skipped.
    #[serde(default = "total_skipped")]
    pub total_pages: i64,
}

fn total_skipped() -> i64 {
    -1
}

/// Response of the `auth-with-password` route.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    /// The issued bearer token (sensitive — never log).
    pub token: String,
    /// The authenticated record.
    pub record: AuthRecord,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("record", &self.record)
            .finish()
    }
}

#[derive(Serialize)]
struct AuthRequestPayload {
    identity: String,
    password: String,
}

/// Service for the records of one collection.
#[derive(Debug, Clone)]
pub struct RecordService {
    core: Arc<ClientCore>,
    collection: String,
}

impl RecordService {
    pub(crate) fn new(core: Arc<ClientCore>, collection: String) -> Self {
        Self { core, collection }
    }

    fn records_url(&self) -> String {
        format!(
            "{}/api/collections/{}/records",
            self.core.base_url, self.collection
        )
    }

    /// Fetches one page of records.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a backend error payload,
    /// or an undecodable response body.
    #[instrument(level = "debug", skip(self, options), fields(collection = %self.collection))]
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        options: &ListOptions,
    ) -> Result<ListResponse<T>, ApiError> {
        let url = format!("{}{}", self.records_url(), options.to_query_string());
        let request = self.core.http.get(&url).headers(self.core.auth_headers());
        let response = self.core.send(request, &url).await?;
        handle_json_response(&url, response).await
    }

    /// Fetches one record by id. The backend answers 404 for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get_list`](Self::get_list).
    #[instrument(level = "debug", skip(self, options), fields(collection = %self.collection))]
    pub async fn get_one<T: DeserializeOwned>(
        &self,
        id: &str,
        options: &ViewOptions,
    ) -> Result<T, ApiError> {
        let url = format!(
            "{}/{}{}",
            self.records_url(),
            encode(id),
            options.to_query_string()
        );
        let request = self.core.http.get(&url).headers(self.core.auth_headers());
        let response = self.core.send(request, &url).await?;
        handle_json_response(&url, response).await
    }

    /// Fetches every record of the collection, page by page.
    ///
    /// The total count is skipped on each page; fetching stops at the first
    /// page shorter than the requested page size.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get_list`](Self::get_list).
    #[instrument(level = "debug", skip(self), fields(collection = %self.collection))]
    pub async fn get_full_list<T: DeserializeOwned>(&self) -> Result<Vec<T>, ApiError> {
        let mut page = 1u64;
        let mut items: Vec<T> = Vec::new();
        loop {
            let batch = self
                .get_list::<T>(&ListOptions::paginated_and_skip(page, FULL_LIST_PAGE_SIZE))
                .await?;
            let fetched = batch.items.len() as u64;
            items.extend(batch.items);
            if fetched < batch.per_page {
                break;
            }
            page += 1;
        }
        debug!(records = items.len(), "fetched full list");
        Ok(items)
    }

    /// Returns the first record matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a backend 404 error when nothing matches, mirroring
    /// [`get_one`](Self::get_one) for unknown ids; other errors as in
    /// [`get_list`](Self::get_list).
    #[instrument(level = "debug", skip(self), fields(collection = %self.collection))]
    pub async fn get_first_list_item<T: DeserializeOwned>(
        &self,
        filter: &str,
    ) -> Result<T, ApiError> {
        let mut batch = self
            .get_list::<T>(&ListOptions::first_match(filter))
            .await?;
        match batch.items.pop() {
            Some(item) => Ok(item),
            None => Err(ApiError::backend(
                self.records_url(),
                404,
                "no record matching the requested filter",
            )),
        }
    }

    /// Creates a record and returns it as stored by the backend.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get_list`](Self::get_list); validation
    /// failures surface as backend 400 errors.
    #[instrument(level = "debug", skip(self, body), fields(collection = %self.collection))]
    pub async fn create<T: DeserializeOwned, S: Serialize>(&self, body: &S) -> Result<T, ApiError> {
        let url = self.records_url();
        let request = self
            .core
            .http
            .post(&url)
            .headers(self.core.auth_headers())
            .json(body);
        let response = self.core.send(request, &url).await?;
        handle_json_response(&url, response).await
    }

    /// Updates an existing record by id.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get_list`](Self::get_list).
    #[instrument(level = "debug", skip(self, body), fields(collection = %self.collection))]
    pub async fn update<T: DeserializeOwned, S: Serialize>(
        &self,
        id: &str,
        body: &S,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.records_url(), encode(id));
        let request = self
            .core
            .http
            .patch(&url)
            .headers(self.core.auth_headers())
            .json(body);
        let response = self.core.send(request, &url).await?;
        handle_json_response(&url, response).await
    }

    /// Deletes a record by id. Success has an empty response body.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get_list`](Self::get_list).
    #[instrument(level = "debug", skip(self), fields(collection = %self.collection))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = format!("{}/{}", self.records_url(), encode(id));
        let request = self
            .core
            .http
            .delete(&url)
            .headers(self.core.auth_headers());
        let response = self.core.send(request, &url).await?;
        handle_empty_response(&url, response).await
    }

    /// Authenticates against this collection with an identity and password.
    ///
    /// On success the token and record are stored in the shared auth store,
    /// so subsequent requests through the same client carry the bearer token.
    ///
    /// # Errors
    ///
    /// Invalid credentials surface as a backend 400 error; other errors as
    /// in [`get_list`](Self::get_list).
    #[instrument(level = "debug", skip(self, identity, password), fields(collection = %self.collection))]
    pub async fn auth_with_password(
        &self,
        identity: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = format!(
            "{}/api/collections/{}/auth-with-password",
            self.core.base_url, self.collection
        );
        let payload = AuthRequestPayload {
            identity: identity.to_string(),
            password: password.to_string(),
        };
        let request = self.core.http.post(&url).json(&payload);
        let response = self.core.send(request, &url).await?;
        let auth: AuthResponse = handle_json_response(&url, response).await?;

        self.core
            .write_auth()
            .set_auth(auth.token.clone(), auth.record.clone());
        debug!(record = %auth.record.id, "authenticated");

        Ok(auth)
    }
}
