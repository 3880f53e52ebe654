// ABOUTME: Objectives and key results for OKRDesk
// ABOUTME: Storage with aggregate progress and status transitions

pub mod storage;

pub use storage::ObjectiveStorage;
