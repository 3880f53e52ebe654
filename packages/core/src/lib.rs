// ABOUTME: Core record types, traits, and utilities for OKRDesk
// ABOUTME: Foundational package providing shared data shapes across all OKRDesk packages

pub mod constants;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    Department, DepartmentCreateInput, DepartmentUpdateInput, KeyResult, KeyResultCreateInput,
    KeyResultUpdateInput, Kpi, KpiCreateInput, KpiFilter, KpiStatus, KpiType, KpiUpdateInput,
    Objective, ObjectiveCreateInput, ObjectiveFilter, ObjectiveStatus, ObjectiveUpdateInput,
    PublicUser, Role, Task, TaskCreateInput, TaskFilter, TaskPriority, TaskStatus,
    TaskUpdateInput, User, UserCreateInput, UserFilter, UserUpdateInput,
};

// Re-export constants
pub use constants::{database_file, okrdesk_dir, session_file};

// Re-export utilities
pub use utils::{compute_progress, generate_id, mean_progress, quarter_of};

// Re-export validation
pub use validation::{normalize_email, truncate, ValidationError};
