// ABOUTME: Error types for key-value store backends
// ABOUTME: Only backends surface these; SafeStore absorbs them

use thiserror::Error;

pub type KvResult<T> = Result<T, KvError>;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store contents: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
