// ABOUTME: Data layer and persistence for OKRDesk
// ABOUTME: Shared storage errors, SQLite pool setup, and embedded schema migrations

use okrdesk_core::ValidationError;
use thiserror::Error;

pub mod db;

pub use db::{connect, connect_existing, connect_in_memory, MIGRATOR};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("A user with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("Duplicate name: {0}")]
    DuplicateName(String),
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Credential error: {0}")]
    Credential(String),
    #[error("Validation failed: {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Map a write failure, turning unique-constraint violations into the given error
    /// and check/foreign-key violations into `ConstraintViolation`
    pub fn from_write<F>(err: sqlx::Error, on_unique: F) -> Self
    where
        F: FnOnce() -> StorageError,
    {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return on_unique();
            }
            if db_err.is_check_violation() || db_err.is_foreign_key_violation() {
                return StorageError::ConstraintViolation(db_err.message().to_string());
            }
        }
        StorageError::Sqlx(err)
    }

    /// Turn a non-empty list of validation errors into an error
    pub fn check(errors: Vec<ValidationError>) -> StorageResult<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StorageError::Validation(errors))
        }
    }
}
