//! Authentication state and cookie handling.
//!
//! This module provides the cookie header decoder, the `pb_auth` cookie
//! codec, and the in-memory auth store the API client shares across services.

mod cookie;
mod store;

pub use cookie::{
    AUTH_COOKIE_NAME, AuthCookiePayload, export_auth_cookie, import_auth_cookie,
    parse_cookie_header,
};
pub use store::{AuthRecord, AuthStore, SUPERUSERS_COLLECTION};
