// ABOUTME: KPI tracking for OKRDesk
// ABOUTME: Storage for departmental and personal KPIs and their lifecycle status

pub mod storage;

pub use storage::{reopen_if_extended, status_for, KpiStorage};
