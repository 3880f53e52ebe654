// ABOUTME: Login session module
// ABOUTME: Bearer token issuance, verification, and expiry

pub mod storage;
pub mod types;

pub use storage::SessionStorage;
pub use types::{IssuedSession, Session};
