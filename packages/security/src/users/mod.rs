// ABOUTME: User accounts module
// ABOUTME: Hashed-password storage with role and department filters

pub mod storage;

pub use storage::UserStorage;
