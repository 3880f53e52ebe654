// ABOUTME: Fallback-aware key-value storage for client session state
// ABOUTME: Persistent file store with an in-memory substitute when storage is denied

//! # OKRDesk KV Store
//!
//! [`SafeStore`] wraps any [`KeyValueStore`] and guarantees that `get`, `set`,
//! `remove` and `clear` never fail. When the wrapped store cannot be used,
//! because the probe at construction failed, the store reports itself
//! unreachable, or a call errors mid-session, the operation is served from a
//! process-local [`MemoryStore`] and a warning is logged.
//!
//! Values written while the persistent store is unusable live only as long as
//! the process.

pub mod error;
pub mod file;
pub mod memory;
pub mod safe;

pub use error::{KvError, KvResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use safe::{SafeStore, PROBE_KEY};

/// A string-keyed, string-valued store whose operations may fail
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> KvResult<()>;
    fn remove(&self, key: &str) -> KvResult<()>;
    fn clear(&self) -> KvResult<()>;

    /// Cheap check that the backing resource still exists. Checked before every
    /// persistent access.
    fn is_reachable(&self) -> bool {
        true
    }
}
