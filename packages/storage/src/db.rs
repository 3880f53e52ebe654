// ABOUTME: SQLite connection pool setup and migration runner
// ABOUTME: Provides file-backed pools for the server and in-memory pools for tests

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{StorageError, StorageResult};

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open (creating if needed) the database at `path` and bring its schema up to date
pub async fn connect(path: &Path) -> StorageResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let database_url = format!("sqlite://{}", path.display());
    debug!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(&database_url)
        .map_err(StorageError::Sqlx)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    info!("Database connection established");

    MIGRATOR.run(&pool).await?;
    debug!("Database migrations applied");

    Ok(pool)
}

/// Open an existing database without creating, migrating, or touching parent directories
pub async fn connect_existing(path: &Path) -> StorageResult<SqlitePool> {
    let database_url = format!("sqlite://{}", path.display());
    debug!("Opening existing database: {}", database_url);

    let options = SqliteConnectOptions::from_str(&database_url)
        .map_err(StorageError::Sqlx)?
        .create_if_missing(false)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)
}

/// Single-connection in-memory database with the full schema applied
pub async fn connect_in_memory() -> StorageResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(StorageError::Sqlx)?
        .foreign_keys(true);

    // One connection: every pooled connection to :memory: would be a separate database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}
