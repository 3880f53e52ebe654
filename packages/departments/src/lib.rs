// ABOUTME: Department management for OKRDesk
// ABOUTME: Provides CRUD storage for departments and their member counts

pub mod storage;

pub use storage::DepartmentStorage;
