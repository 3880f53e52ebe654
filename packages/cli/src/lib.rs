// ABOUTME: Library side of the okrdesk binary
// ABOUTME: Server startup, API client, stored CLI session, and the database check

pub mod client;
pub mod diagnostics;
pub mod error;
pub mod server;
pub mod session;

pub use client::ApiClient;
pub use diagnostics::{check_database, DbReport};
pub use error::{CliError, CliResult};
pub use server::run_server;
pub use session::{SessionState, StoredSession};
