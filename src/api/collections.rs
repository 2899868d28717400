//! Requests concerning the collections themselves, rather than the records
//! they contain. The backend gates these routes to superusers.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use urlencoding::encode;

use super::client::{ClientCore, handle_json_response};
use super::error::ApiError;
use super::options::ListOptions;
use super::records::ListResponse;

/// All API requests concerning collections go through this path.
const COLLECTIONS_PATH: &str = "/api/collections";

/// A collection definition as returned by the backend.
///
/// Only the fields this crate consumes are modeled; the backend returns more.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionModel {
    /// Collection id.
    pub id: String,
    /// Collection name.
    pub name: String,
    /// Collection type (`base`, `auth`, `view`).
    #[serde(rename = "type")]
    pub collection_type: String,
    /// Whether this is a system collection.
    #[serde(default)]
    pub system: bool,
}

/// Service for collection management.
#[derive(Debug, Clone)]
pub struct CollectionService {
    core: Arc<ClientCore>,
}

impl CollectionService {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }

    fn collections_url(&self) -> String {
        format!("{}{}", self.core.base_url, COLLECTIONS_PATH)
    }

    /// Fetches one page of collection definitions.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a backend error payload
    /// (403 without a superuser token), or an undecodable response body.
    #[instrument(level = "debug", skip(self, options))]
    pub async fn get_list(
        &self,
        options: &ListOptions,
    ) -> Result<ListResponse<CollectionModel>, ApiError> {
        let url = format!("{}{}", self.collections_url(), options.to_query_string());
        let request = self.core.http.get(&url).headers(self.core.auth_headers());
        let response = self.core.send(request, &url).await?;
        handle_json_response(&url, response).await
    }

    /// Fetches a collection by id or name. Unknown collections answer 404.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get_list`](Self::get_list).
    #[instrument(level = "debug", skip(self))]
    pub async fn get_one(&self, id_or_name: &str) -> Result<CollectionModel, ApiError> {
        let url = format!("{}/{}", self.collections_url(), encode(id_or_name));
        let request = self.core.http.get(&url).headers(self.core.auth_headers());
        let response = self.core.send(request, &url).await?;
        handle_json_response(&url, response).await
    }

    /// Creates a collection from a definition body.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get_list`](Self::get_list); a name
    /// conflict surfaces as a backend 400 error.
    #[instrument(level = "debug", skip(self, body))]
    pub async fn create<T: DeserializeOwned, S: Serialize>(&self, body: &S) -> Result<T, ApiError> {
        let url = self.collections_url();
        let request = self
            .core
            .http
            .post(&url)
            .headers(self.core.auth_headers())
            .json(body);
        let response = self.core.send(request, &url).await?;
        handle_json_response(&url, response).await
    }
}
