//! In-memory auth state shared by the API client.

use std::fmt;

use serde::Deserialize;

/// Collection holding administrative accounts on the backend.
pub const SUPERUSERS_COLLECTION: &str = "_superusers";

/// The authenticated record as returned by `auth-with-password`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    /// Record id.
    pub id: String,
    /// Id of the collection the record belongs to.
    pub collection_id: String,
    /// Name of the collection the record belongs to.
    pub collection_name: String,
    /// Account email.
    pub email: String,
    /// Whether the account email is verified.
    #[serde(default)]
    pub verified: bool,
    /// Creation timestamp as reported by the backend.
    #[serde(default)]
    pub created: String,
    /// Last-update timestamp as reported by the backend.
    #[serde(default)]
    pub updated: String,
}

/// Holds the current bearer token and authenticated record.
///
/// The store itself carries no synchronization; the client wraps it in a
/// lock. The token is redacted in Debug output.
#[derive(Default, Clone)]
pub struct AuthStore {
    token: Option<String>,
    record: Option<AuthRecord>,
}

impl AuthStore {
    /// Returns the current bearer token, if any.
    ///
    /// The token is sensitive — avoid logging the return value.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the authenticated record, if any.
    #[must_use]
    pub fn record(&self) -> Option<&AuthRecord> {
        self.record.as_ref()
    }

    /// Stores a full auth response: token plus record.
    pub fn set_auth(&mut self, token: String, record: AuthRecord) {
        self.token = Some(token);
        self.record = Some(record);
    }

    /// Stores a token alone, e.g. one recovered from a `pb_auth` cookie.
    ///
    /// The store is not valid until a record is attached as well.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Attaches the authenticated record, e.g. after hydrating it by id.
    pub fn set_record(&mut self, record: AuthRecord) {
        self.record = Some(record);
    }

    /// Drops all auth state.
    pub fn clear(&mut self) {
        self.token = None;
        self.record = None;
    }

    /// True when both a token and a record are present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.token.is_some() && self.record.is_some()
    }

    /// True when valid and the record belongs to the superusers collection.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(|record| record.collection_name == SUPERUSERS_COLLECTION)
            && self.token.is_some()
    }
}

impl fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStore")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("record", &self.record)
            .finish()
    }
}
