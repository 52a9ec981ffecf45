//! services/client/src/adapters/token_file.rs
//!
//! This module contains the file-backed token store, the concrete implementation
//! of the `TokenStore` port from the `core` crate. The token lives in a single
//! well-known file and is the only piece of state that survives a restart.

use std::io::ErrorKind;
use std::path::PathBuf;

use paper_feed_core::ports::{PortError, PortResult, TokenStore};

/// A token store that keeps the session token in one file on disk.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a new `FileTokenStore` persisting to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> PortResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                Ok(if token.is_empty() { None } else { Some(token) })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(format!(
                "Failed to read token file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, token: &str) -> PortResult<()> {
        std::fs::write(&self.path, token).map_err(|e| {
            PortError::Unexpected(format!(
                "Failed to write token file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn clear(&self) -> PortResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            // Clearing an already-empty slot is a no-op; logout is idempotent.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(format!(
                "Failed to remove token file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("paper_feed_{}_{}", name, std::process::id()))
    }

    #[test]
    fn load_returns_none_when_no_token_was_saved() {
        let store = FileTokenStore::new(scratch_path("missing"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = FileTokenStore::new(scratch_path("round_trip"));
        store.save("tok-123").unwrap();
        assert_eq!(store.load().unwrap(), Some("tok-123".to_string()));
        store.clear().unwrap();
    }

    #[test]
    fn clear_is_idempotent() {
        let store = FileTokenStore::new(scratch_path("clear_twice"));
        store.save("tok-123").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
