//! crates/paper_feed_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::NaiveDate;

/// The client's view of the authenticated session.
///
/// `token` alone decides authenticated status; `user` is only populated after
/// a successful who-am-I lookup and may lag behind the token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    /// Token presence is the whole authentication judgment. No expiry is
    /// checked client-side; a dead token surfaces on the next server call.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// The profile returned by the who-am-I endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
}

/// One day's paper tally as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub count: u32,
}

/// A recommended paper. Read-only from the client's perspective; `score` is
/// server-computed and never recomputed locally.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub id: i64,
    pub arxiv_id: String,
    pub title: String,
    pub abstract_text: String,
    pub authors: String,
    /// Space-separated category tokens, e.g. "cs.LG cs.AI".
    pub categories: String,
    pub published_date: NaiveDate,
    pub score: f64,
}

/// One row of the user's authoritative rating set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRating {
    pub paper_id: i64,
    pub rating: u8,
}
