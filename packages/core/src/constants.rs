// ABOUTME: Well-known file locations under the OKRDesk home directory
// ABOUTME: Resolves ~/.okrdesk and the database and session files inside it

use std::env;
use std::path::PathBuf;

/// File name of the SQLite database inside the OKRDesk directory
pub const DATABASE_FILE_NAME: &str = "okrdesk.db";

/// File name of the CLI session store inside the OKRDesk directory
pub const SESSION_FILE_NAME: &str = "session.json";

/// Get the path to the OKRDesk directory (~/.okrdesk)
pub fn okrdesk_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".okrdesk")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".okrdesk")
    }
}

/// Get the default database path (~/.okrdesk/okrdesk.db)
pub fn database_file() -> PathBuf {
    okrdesk_dir().join(DATABASE_FILE_NAME)
}

/// Get the CLI session store path (~/.okrdesk/session.json)
pub fn session_file() -> PathBuf {
    okrdesk_dir().join(SESSION_FILE_NAME)
}
