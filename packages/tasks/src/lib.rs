// ABOUTME: Task management for OKRDesk
// ABOUTME: Provides CRUD storage for tasks linked to assignees and key results

pub mod storage;

pub use storage::*;
