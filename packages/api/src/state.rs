// ABOUTME: Shared application state handed to every request handler
// ABOUTME: Wraps the SQLite pool and one storage handle per record kind

use std::sync::Arc;

use chrono::Duration;
use okrdesk_departments::DepartmentStorage;
use okrdesk_kpis::KpiStorage;
use okrdesk_objectives::ObjectiveStorage;
use okrdesk_security::{SessionStorage, UserStorage};
use okrdesk_tasks::TaskStorage;
use sqlx::SqlitePool;

/// Database state for API handlers
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub user_storage: Arc<UserStorage>,
    pub session_storage: Arc<SessionStorage>,
    pub department_storage: Arc<DepartmentStorage>,
    pub objective_storage: Arc<ObjectiveStorage>,
    pub task_storage: Arc<TaskStorage>,
    pub kpi_storage: Arc<KpiStorage>,
    /// Lifetime of sessions opened by `POST /api/auth/login`
    pub session_ttl: Duration,
}

impl DbState {
    pub fn new(pool: SqlitePool, session_ttl: Duration) -> Self {
        Self {
            user_storage: Arc::new(UserStorage::new(pool.clone())),
            session_storage: Arc::new(SessionStorage::new(pool.clone())),
            department_storage: Arc::new(DepartmentStorage::new(pool.clone())),
            objective_storage: Arc::new(ObjectiveStorage::new(pool.clone())),
            task_storage: Arc::new(TaskStorage::new(pool.clone())),
            kpi_storage: Arc::new(KpiStorage::new(pool.clone())),
            pool,
            session_ttl,
        }
    }
}
