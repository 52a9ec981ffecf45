//! services/client/src/sync/controller.rs
//!
//! The orchestration layer for the client's mirrored state. This is the only
//! component that commits results into the cache or touches the status board;
//! UI code invokes the operations here and reads state back through the
//! accessors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use paper_feed_core::domain::{DateBucket, Paper, UserProfile};
use paper_feed_core::ports::{PortError, PortResult, RecommendationService, TokenStore};
use tracing::{info, warn};

use super::state::CacheState;
use super::status::OpKey;

//=========================================================================================
// Operation Error Type
//=========================================================================================

/// The error type returned by controller operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Rejected locally before any network call was made. Validation
    /// failures are reported to the caller only and never touch the status
    /// board.
    #[error("{0}")]
    Validation(String),

    /// A server or transport failure. The human-readable message has already
    /// been recorded on the status board by the time the caller sees this.
    #[error(transparent)]
    Port(#[from] PortError),
}

//=========================================================================================
// The Controller
//=========================================================================================

/// Owns the aggregate cache state and coordinates every server interaction.
///
/// Operations take `&self` and may interleave freely; the state mutex is only
/// held for the synchronous transitions around each network round trip, never
/// across an await. No operation is cancelled, timed out, or retried
/// automatically; retry happens when the user repeats the triggering action.
pub struct SyncController {
    api: Arc<dyn RecommendationService>,
    tokens: Arc<dyn TokenStore>,
    state: Mutex<CacheState>,
}

impl SyncController {
    /// Creates the controller, seeding the session from the durable token
    /// slot so an earlier run's login survives a restart.
    pub fn new(
        api: Arc<dyn RecommendationService>,
        tokens: Arc<dyn TokenStore>,
    ) -> PortResult<Self> {
        let token = tokens.load()?;
        if token.is_some() {
            info!("restored session token from storage");
        }
        Ok(Self {
            api,
            tokens,
            state: Mutex::new(CacheState::new(token)),
        })
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().expect("cache state mutex poisoned")
    }

    fn begin(&self, key: OpKey) {
        self.state().status.begin(key);
    }

    fn no_session() -> PortError {
        PortError::Auth("No session token; log in first".to_string())
    }

    //=====================================================================================
    // Session Operations
    //=====================================================================================

    /// Exchanges credentials for a token and persists it.
    ///
    /// On failure nothing is stored and a previously held token is left
    /// untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, SyncError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(SyncError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        self.begin(OpKey::Auth);
        let result = match self.api.login(email, password).await {
            Ok(token) => self.tokens.save(&token).map(|()| token),
            Err(e) => Err(e),
        };

        let mut state = self.state();
        if let Ok(token) = &result {
            state.session.token = Some(token.clone());
            info!("login succeeded");
        }
        state.status.finish(OpKey::Auth, &result);
        drop(state);

        Ok(result?)
    }

    /// Creates an account. Password length and confirmation equality are
    /// checked locally before any network call; a successful registration
    /// does not log the user in and stores nothing.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<UserProfile, SyncError> {
        if password != confirm_password {
            return Err(SyncError::Validation("Passwords do not match".to_string()));
        }
        if password.chars().count() < 8 {
            return Err(SyncError::Validation(
                "Password must be at least 8 characters long".to_string(),
            ));
        }

        self.begin(OpKey::Auth);
        let result = self.api.register(email, password).await;
        self.state().status.finish(OpKey::Auth, &result);

        Ok(result?)
    }

    /// Looks up the authenticated user's profile and stores it on the
    /// session. Token presence alone decides authenticated status, so this is
    /// side-effect only.
    pub async fn fetch_current_user(&self) -> Result<UserProfile, SyncError> {
        self.begin(OpKey::Auth);
        let result = if self.token().is_some() {
            self.api.current_user().await
        } else {
            Err(Self::no_session())
        };

        let mut state = self.state();
        if let Ok(user) = &result {
            state.session.user = Some(user.clone());
        }
        state.status.finish(OpKey::Auth, &result);
        drop(state);

        Ok(result?)
    }

    /// Ends the session: token and profile are dropped and the durable slot
    /// is cleared synchronously. Idempotent.
    ///
    /// Paper and rating caches are left in place: a different user logging in
    /// next sees the previous user's cached papers and ratings until fresh
    /// fetches replace them. Known limitation.
    pub fn logout(&self) -> Result<(), SyncError> {
        let mut state = self.state();
        state.session.token = None;
        state.session.user = None;
        drop(state);

        self.tokens.clear()?;
        info!("logged out");
        Ok(())
    }

    //=====================================================================================
    // Paper Operations
    //=====================================================================================

    /// Replaces the whole date catalogue with the server's current snapshot,
    /// keeping server order. Listing dates does not load any papers.
    pub async fn load_dates(&self) -> Result<Vec<DateBucket>, SyncError> {
        self.begin(OpKey::Dates);
        let result = if self.token().is_some() {
            self.api.list_dates().await
        } else {
            Err(Self::no_session())
        };

        let mut state = self.state();
        if let Ok(dates) = &result {
            state.dates = dates.clone();
        }
        state.status.finish(OpKey::Dates, &result);
        drop(state);

        Ok(result?)
    }

    /// Lazily loads the papers for one date.
    ///
    /// A date fetched once this session is never fetched again: the cached
    /// papers are returned as-is, without a network call. A failed fetch does
    /// not mark the date loaded, so repeating the action retries it.
    pub async fn load_papers_for_date(&self, date: NaiveDate) -> Result<Vec<Paper>, SyncError> {
        {
            let state = self.state();
            if state.loaded_dates.contains(&date) {
                return Ok(state.papers_by_date.get(&date).cloned().unwrap_or_default());
            }
        }

        self.begin(OpKey::Papers(date));
        let result = if self.token().is_some() {
            self.api.papers_for_date(date).await
        } else {
            Err(Self::no_session())
        };

        let mut state = self.state();
        if let Ok(papers) = &result {
            state.papers_by_date.insert(date, papers.clone());
            state.loaded_dates.insert(date);
            info!(%date, papers = papers.len(), "cached papers for date");
        }
        state.status.finish(OpKey::Papers(date), &result);
        drop(state);

        Ok(result?)
    }

    //=====================================================================================
    // Rating Operations
    //=====================================================================================

    /// Replaces the rating cache with the server's full authoritative set.
    /// Entries absent from the latest response disappear locally too.
    pub async fn fetch_user_ratings(&self) -> Result<HashMap<i64, u8>, SyncError> {
        self.begin(OpKey::Ratings);
        let result = if self.token().is_some() {
            self.api.user_ratings().await
        } else {
            Err(Self::no_session())
        };
        let result =
            result.map(|rows| rows.into_iter().map(|r| (r.paper_id, r.rating)).collect::<HashMap<_, _>>());

        let mut state = self.state();
        if let Ok(ratings) = &result {
            state.ratings = ratings.clone();
        }
        state.status.finish(OpKey::Ratings, &result);
        drop(state);

        Ok(result?)
    }

    /// Submits a rating, then re-reads the full authoritative rating set
    /// before resolving. The new rating is never written into the cache
    /// directly.
    ///
    /// A failed write aborts the resync and leaves the cache unchanged. A
    /// failed resync after a successful write leaves the cache stale until
    /// the next successful fetch.
    pub async fn rate_paper(&self, paper_id: i64, rating: u8) -> Result<(), SyncError> {
        if !(1..=5).contains(&rating) {
            return Err(SyncError::Validation(format!(
                "Rating must be between 1 and 5, got {}",
                rating
            )));
        }

        self.begin(OpKey::Ratings);
        let write = if self.token().is_some() {
            self.api.submit_rating(paper_id, rating).await
        } else {
            Err(Self::no_session())
        };
        self.state().status.finish(OpKey::Ratings, &write);
        if let Err(e) = write {
            warn!(paper_id, "rating submission failed: {}", e);
            return Err(e.into());
        }

        self.fetch_user_ratings().await?;
        Ok(())
    }

    //=====================================================================================
    // Status Resets
    //=====================================================================================

    pub fn clear_error(&self, key: OpKey) {
        self.state().status.clear_error(key);
    }

    pub fn clear_errors(&self) {
        self.state().status.clear_errors();
    }

    //=====================================================================================
    // Read Accessors (derived views; clones only)
    //=====================================================================================

    /// True iff a session token is held. No expiry judgment is made here; an
    /// expired token surfaces as an `Auth` failure on the next call.
    pub fn is_authenticated(&self) -> bool {
        self.state().session.is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.state().session.token.clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state().session.user.clone()
    }

    pub fn dates(&self) -> Vec<DateBucket> {
        self.state().dates.clone()
    }

    /// The cached papers for a date, or `None` if that date was never
    /// successfully loaded this session.
    pub fn papers_for(&self, date: NaiveDate) -> Option<Vec<Paper>> {
        self.state().papers_by_date.get(&date).cloned()
    }

    pub fn is_date_loaded(&self, date: NaiveDate) -> bool {
        self.state().loaded_dates.contains(&date)
    }

    pub fn rating_for(&self, paper_id: i64) -> Option<u8> {
        self.state().ratings.get(&paper_id).copied()
    }

    pub fn ratings(&self) -> HashMap<i64, u8> {
        self.state().ratings.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().status.is_loading()
    }

    pub fn is_op_loading(&self, key: OpKey) -> bool {
        self.state().status.is_op_loading(key)
    }

    pub fn error(&self, key: OpKey) -> Option<String> {
        self.state().status.error(key).map(str::to_string)
    }

    pub fn errors(&self) -> Vec<(OpKey, String)> {
        self.state()
            .status
            .errors()
            .map(|(k, v)| (*k, v.to_string()))
            .collect()
    }
}

//=========================================================================================
// Tests
//=========================================================================================
