//! REST client for the backend API.

mod client;
mod collections;
mod error;
mod health;
mod options;
mod records;

pub use client::{ApiClient, CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
pub use collections::{CollectionModel, CollectionService};
pub use error::{ApiError, ErrorBody};
pub use health::{
    DEFAULT_READY_ATTEMPTS, HealthStatus, ReadinessPolicy, wait_until_ready,
};
pub use options::{ListOptions, ViewOptions};
pub use records::{AuthResponse, FULL_LIST_PAGE_SIZE, ListResponse, RecordService};
