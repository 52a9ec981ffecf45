//! crates/paper_feed_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like HTTP transports
//! or token storage.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{DateBucket, Paper, UserProfile, UserRating};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP client,
/// filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The server rejected the credentials or the registration data, or an
    /// authenticated call came back 401/403 (e.g. an expired token).
    #[error("Authentication failed: {0}")]
    Auth(String),
    /// Transport/connectivity failure, or a non-2xx response with no
    /// domain-specific meaning.
    #[error("Network error: {0}")]
    Network(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote paper-recommendation API.
///
/// The implementation is expected to attach the bearer token itself on every
/// call that needs one; callers never pass credentials except to `login` and
/// `register`.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    // --- Auth ---

    /// Exchanges credentials for a bearer token using the password-grant
    /// convention (form-encoded body, `username` field carries the email).
    async fn login(&self, email: &str, password: &str) -> PortResult<String>;

    async fn register(&self, email: &str, password: &str) -> PortResult<UserProfile>;

    async fn current_user(&self) -> PortResult<UserProfile>;

    // --- Papers ---

    /// The server's current catalogue of date buckets, in server order.
    async fn list_dates(&self) -> PortResult<Vec<DateBucket>>;

    async fn papers_for_date(&self, date: NaiveDate) -> PortResult<Vec<Paper>>;

    // --- Ratings ---

    /// The full authoritative set of the user's ratings.
    async fn user_ratings(&self) -> PortResult<Vec<UserRating>>;

    async fn submit_rating(&self, paper_id: i64, rating: u8) -> PortResult<()>;
}

/// Durable, single-slot storage for the session token.
///
/// The slot is read once at process start to seed the session and must clear
/// synchronously on logout. Only the token survives restarts; the user profile
/// is always re-fetched.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> PortResult<Option<String>>;

    fn save(&self, token: &str) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;
}
