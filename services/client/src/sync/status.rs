//! services/client/src/sync/status.rs
//!
//! Per-operation loading/error tracking for the sync layer.
//!
//! Loading and error state is keyed by operation identity instead of one flat
//! flag pair, so two concurrent fetches cannot clobber each other's outcome.
//! Every async operation runs the same transition pair around its network
//! round trip: `begin` before the call, `finish` with the tagged result after.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use paper_feed_core::ports::PortResult;

/// Identity of an asynchronous operation, used to scope status state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKey {
    /// Login, registration, and the who-am-I lookup.
    Auth,
    /// The date-bucket catalogue fetch.
    Dates,
    /// The paper fetch for one specific date.
    Papers(NaiveDate),
    /// Rating fetches and submissions.
    Ratings,
}

/// Tracks which operations are in flight and the last error message per key.
#[derive(Debug, Default)]
pub struct StatusBoard {
    in_flight: HashSet<OpKey>,
    errors: HashMap<OpKey, String>,
}

impl StatusBoard {
    /// Marks an operation as started: loading on, that key's error cleared.
    pub fn begin(&mut self, key: OpKey) {
        self.in_flight.insert(key);
        self.errors.remove(&key);
    }

    /// Marks an operation as settled. On failure the human-readable message
    /// is recorded under the key; on success nothing is left behind.
    pub fn finish<T>(&mut self, key: OpKey, result: &PortResult<T>) {
        self.in_flight.remove(&key);
        if let Err(e) = result {
            self.errors.insert(key, e.to_string());
        }
    }

    /// True while any operation is in flight.
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_op_loading(&self, key: OpKey) -> bool {
        self.in_flight.contains(&key)
    }

    pub fn error(&self, key: OpKey) -> Option<&str> {
        self.errors.get(&key).map(String::as_str)
    }

    /// All currently recorded errors, one per failed key.
    pub fn errors(&self) -> impl Iterator<Item = (&OpKey, &str)> {
        self.errors.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn clear_error(&mut self, key: OpKey) {
        self.errors.remove(&key);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}
