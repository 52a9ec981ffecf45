//! services/client/src/sync/state.rs
//!
//! The aggregate cache state mirrored from the server.
//!
//! Created once per process start and owned exclusively by the
//! `SyncController`; everything else reads derived views through the
//! controller's accessors and never mutates the state directly.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use paper_feed_core::domain::{DateBucket, Paper, Session};

use super::status::StatusBoard;

/// Everything the client has mirrored from the server so far.
pub struct CacheState {
    pub(crate) session: Session,
    /// The server's date catalogue, in server order. Replaced wholesale on
    /// every refresh, never merged.
    pub(crate) dates: Vec<DateBucket>,
    pub(crate) papers_by_date: HashMap<NaiveDate, Vec<Paper>>,
    /// Dates whose papers have been fetched at least once. Grows
    /// monotonically within a session; nothing is ever evicted.
    pub(crate) loaded_dates: HashSet<NaiveDate>,
    /// The user's ratings, paper id → rating. Always the full authoritative
    /// set from the last successful ratings fetch.
    pub(crate) ratings: HashMap<i64, u8>,
    pub(crate) status: StatusBoard,
}

impl CacheState {
    /// Creates the initial state, seeding the session with a token persisted
    /// by an earlier run (if any). The user profile is never persisted and
    /// must be re-fetched.
    pub(crate) fn new(token: Option<String>) -> Self {
        Self {
            session: Session { token, user: None },
            dates: Vec::new(),
            papers_by_date: HashMap::new(),
            loaded_dates: HashSet::new(),
            ratings: HashMap::new(),
            status: StatusBoard::default(),
        }
    }
}
