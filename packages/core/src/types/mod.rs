// ABOUTME: Record type definitions shared by storage, API, and CLI
// ABOUTME: Users, departments, objectives with key results, tasks, and KPIs

mod department;
mod kpi;
mod objective;
mod task;
mod user;

pub use department::{Department, DepartmentCreateInput, DepartmentUpdateInput};
pub use kpi::{Kpi, KpiCreateInput, KpiFilter, KpiStatus, KpiType, KpiUpdateInput};
pub use objective::{
    KeyResult, KeyResultCreateInput, KeyResultUpdateInput, Objective, ObjectiveCreateInput,
    ObjectiveFilter, ObjectiveStatus, ObjectiveUpdateInput,
};
pub use task::{Task, TaskCreateInput, TaskFilter, TaskPriority, TaskStatus, TaskUpdateInput};
pub use user::{PublicUser, Role, User, UserCreateInput, UserFilter, UserUpdateInput};
