// ABOUTME: Signed-in session state kept between CLI invocations
// ABOUTME: Token, email, and API URL stored through the fallback-aware key-value store

use okrdesk_core::{okrdesk_dir, session_file};
use okrdesk_kvstore::{FileStore, KeyValueStore, SafeStore};
use tracing::warn;

pub const TOKEN_KEY: &str = "token";
pub const EMAIL_KEY: &str = "email";
pub const API_URL_KEY: &str = "api_url";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub email: String,
    pub api_url: String,
}

pub struct SessionState<S> {
    store: SafeStore<S>,
}

impl SessionState<FileStore> {
    /// Session state in `~/.okrdesk/session.json`
    pub fn open_default() -> Self {
        if let Err(e) = std::fs::create_dir_all(okrdesk_dir()) {
            warn!("Could not create {}: {}", okrdesk_dir().display(), e);
        }
        Self::new(SafeStore::new(FileStore::new(session_file())))
    }
}

impl<S: KeyValueStore> SessionState<S> {
    pub fn new(store: SafeStore<S>) -> Self {
        Self { store }
    }

    /// Whether the session will survive this process
    pub fn is_persistent(&self) -> bool {
        self.store.is_persistent()
    }

    pub fn save(&self, session: &StoredSession) {
        self.store.set(TOKEN_KEY, &session.token);
        self.store.set(EMAIL_KEY, &session.email);
        self.store.set(API_URL_KEY, &session.api_url);
    }

    /// The stored session, if a token is present
    pub fn load(&self) -> Option<StoredSession> {
        let token = self.store.get(TOKEN_KEY)?;
        Some(StoredSession {
            token,
            email: self.store.get(EMAIL_KEY).unwrap_or_default(),
            api_url: self.store.get(API_URL_KEY).unwrap_or_default(),
        })
    }

    pub fn clear(&self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okrdesk_kvstore::MemoryStore;
    use pretty_assertions::assert_eq;

    fn sample() -> StoredSession {
        StoredSession {
            token: "tok".to_string(),
            email: "ada@example.com".to_string(),
            api_url: "http://localhost:4001".to_string(),
        }
    }

    #[test]
    fn test_save_load_clear() {
        let state = SessionState::new(SafeStore::new(MemoryStore::new()));
        assert_eq!(state.load(), None);

        state.save(&sample());
        assert_eq!(state.load(), Some(sample()));

        state.clear();
        assert_eq!(state.load(), None);
    }

    #[test]
    fn test_file_backed_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        SessionState::new(SafeStore::new(FileStore::new(&path))).save(&sample());
        let reopened = SessionState::new(SafeStore::new(FileStore::new(&path)));

        assert!(reopened.is_persistent());
        assert_eq!(reopened.load(), Some(sample()));
    }

    #[test]
    fn test_unwritable_location_keeps_session_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("session.json");

        let state = SessionState::new(SafeStore::new(FileStore::new(&path)));
        state.save(&sample());

        assert!(!state.is_persistent());
        assert_eq!(state.load(), Some(sample()));
    }
}
