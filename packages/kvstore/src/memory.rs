// ABOUTME: In-process key-value store
// ABOUTME: Never fails; used on its own and as SafeStore's fallback mapping

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{KeyValueStore, KvResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned map is still a valid map
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    pub fn delete(&self, key: &str) {
        self.entries().remove(key);
    }

    pub fn wipe(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.lookup(key))
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.delete(key);
        Ok(())
    }

    fn clear(&self) -> KvResult<()> {
        self.wipe();
        Ok(())
    }
}
