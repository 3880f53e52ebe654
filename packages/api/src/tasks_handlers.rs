// ABOUTME: Task endpoints under /api/tasks
// ABOUTME: Any signed-in user may list, create, update, and delete tasks

use axum::{extract::State, response::IntoResponse};
use okrdesk_core::{TaskCreateInput, TaskFilter, TaskUpdateInput};
use tracing::info;

use crate::auth::CurrentUser;
use crate::extract::{Json, Path, Query};
use crate::pagination::{Page, PageQuery};
use crate::response::{created_or_internal_error, ok_or_internal_error};
use crate::state::DbState;

/// List tasks, optionally filtered by status, assignee, or key result
pub async fn list_tasks(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Query(filter): Query<TaskFilter>,
    Query(pagination): Query<PageQuery>,
) -> impl IntoResponse {
    info!("Listing tasks (page: {})", pagination.page());

    let result = db
        .task_storage
        .list_tasks_paginated(&filter, Some(pagination.limit()), Some(pagination.offset()))
        .await
        .map(|(tasks, total)| Page::new(tasks, &pagination, total));

    ok_or_internal_error(result, "Failed to list tasks")
}

/// Get a single task by ID
pub async fn get_task(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    info!("Getting task: {}", task_id);

    let result = db.task_storage.get_task(&task_id).await;
    ok_or_internal_error(result, "Failed to get task")
}

/// Create a new task
pub async fn create_task(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Json(input): Json<TaskCreateInput>,
) -> impl IntoResponse {
    info!("Creating task '{}'", input.title.trim());

    let result = db.task_storage.create_task(input).await;
    created_or_internal_error(result, "Failed to create task")
}

/// Update an existing task
pub async fn update_task(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(task_id): Path<String>,
    Json(input): Json<TaskUpdateInput>,
) -> impl IntoResponse {
    info!("Updating task: {}", task_id);

    let result = db.task_storage.update_task(&task_id, input).await;
    ok_or_internal_error(result, "Failed to update task")
}

/// Delete a task
pub async fn delete_task(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting task: {}", task_id);

    let result = db
        .task_storage
        .delete_task(&task_id)
        .await
        .map(|_| serde_json::json!({ "deleted": true }));
    ok_or_internal_error(result, "Failed to delete task")
}
