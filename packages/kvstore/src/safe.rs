// ABOUTME: Total key-value accessor over a fallible persistent store
// ABOUTME: Probes availability once and degrades to an in-memory map on any failure

use tracing::warn;

use crate::{KeyValueStore, MemoryStore};

/// Sentinel key written and deleted by the availability probe
pub const PROBE_KEY: &str = "__okrdesk_probe__";

/// Key-value accessor whose operations always complete.
///
/// The persistent store is used only when the construction-time probe
/// succeeded and the store still reports itself reachable. Any error from the
/// persistent store is logged and the call is served by the in-memory map
/// instead. A key held by the in-memory map is newer than any persistent copy,
/// so `get` answers from it first. `remove` and `clear` always apply to the
/// in-memory map as well, so a value written during an outage cannot resurface
/// later.
#[derive(Debug)]
pub struct SafeStore<S> {
    backend: S,
    available: bool,
    fallback: MemoryStore,
}

impl<S: KeyValueStore> SafeStore<S> {
    /// Wrap `backend`, probing it with a write-then-delete of [`PROBE_KEY`]
    pub fn new(backend: S) -> Self {
        let available = probe(&backend);
        if !available {
            warn!("Persistent storage unavailable, session data will not outlive this process");
        }

        Self {
            backend,
            available,
            fallback: MemoryStore::new(),
        }
    }

    /// Outcome of the construction-time probe
    pub fn is_persistent(&self) -> bool {
        self.available
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn persistent(&self) -> Option<&S> {
        if !self.available {
            return None;
        }
        if !self.backend.is_reachable() {
            warn!("Persistent storage no longer reachable, using in-memory fallback");
            return None;
        }
        Some(&self.backend)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.fallback.lookup(key) {
            return Some(value);
        }
        let store = self.persistent()?;

        match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read from persistent storage");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        let Some(store) = self.persistent() else {
            self.fallback.insert(key, value);
            return;
        };

        match store.set(key, value) {
            Ok(()) => self.fallback.delete(key),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to write to persistent storage");
                // Drop the stale persistent copy if the store still allows it
                let _ = store.remove(key);
                self.fallback.insert(key, value);
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Some(store) = self.persistent() {
            if let Err(e) = store.remove(key) {
                warn!(key = %key, error = %e, "Failed to remove from persistent storage");
            }
        }
        self.fallback.delete(key);
    }

    pub fn clear(&self) {
        if let Some(store) = self.persistent() {
            if let Err(e) = store.clear() {
                warn!(error = %e, "Failed to clear persistent storage");
            }
        }
        self.fallback.wipe();
    }
}

fn probe<S: KeyValueStore>(backend: &S) -> bool {
    if !backend.is_reachable() {
        return false;
    }

    match backend
        .set(PROBE_KEY, PROBE_KEY)
        .and_then(|_| backend.remove(PROBE_KEY))
    {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Persistent storage probe failed");
            false
        }
    }
}
