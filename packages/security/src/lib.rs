// ABOUTME: Authentication and account management for OKRDesk
// ABOUTME: Provides password hashing, user storage, session tokens, and admin bootstrap

pub mod bootstrap;
pub mod passwords;
pub mod sessions;
pub mod users;

// Re-export main types for convenience
pub use bootstrap::{ensure_admin, BootstrapOutcome};
pub use passwords::{hash_password, verify_password, PasswordError};
pub use sessions::{IssuedSession, Session, SessionStorage};
pub use users::UserStorage;
