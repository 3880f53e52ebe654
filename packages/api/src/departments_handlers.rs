// ABOUTME: HTTP request handlers for departments
// ABOUTME: Reads for any signed-in user, writes for administrators

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use okrdesk_core::{DepartmentCreateInput, DepartmentUpdateInput};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::pagination::{Page, PageQuery};
use crate::response::{created_or_internal_error, ok_or_internal_error};
use crate::state::DbState;

pub async fn list_departments(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Query(pagination): Query<PageQuery>,
) -> impl IntoResponse {
    info!("Listing departments (page: {})", pagination.page());

    let result = db
        .department_storage
        .list_departments_paginated(Some(pagination.limit()), Some(pagination.offset()))
        .await
        .map(|(departments, total)| Page::new(departments, &pagination, total));

    ok_or_internal_error(result, "Failed to list departments")
}

pub async fn get_department(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let result = db.department_storage.get_department(&id).await;
    ok_or_internal_error(result, "Failed to get department")
}

pub async fn create_department(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<DepartmentCreateInput>,
) -> ApiResult<Response> {
    current_user.require_admin()?;
    info!("Creating department '{}'", input.name.trim());

    let result = db.department_storage.create_department(input).await;
    Ok(created_or_internal_error(result, "Failed to create department"))
}

pub async fn update_department(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<DepartmentUpdateInput>,
) -> ApiResult<Response> {
    current_user.require_admin()?;
    info!("Updating department: {}", id);

    let result = db.department_storage.update_department(&id, input).await;
    Ok(ok_or_internal_error(result, "Failed to update department"))
}

pub async fn delete_department(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    current_user.require_admin()?;
    info!("Deleting department: {}", id);

    let result = db
        .department_storage
        .delete_department(&id)
        .await
        .map(|_| serde_json::json!({ "deleted": true }));
    Ok(ok_or_internal_error(result, "Failed to delete department"))
}
