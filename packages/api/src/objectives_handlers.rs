// ABOUTME: HTTP request handlers for objectives and their key results
// ABOUTME: CRUD plus the submit, approve, reject, and tracking status workflow

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use okrdesk_core::{
    KeyResultCreateInput, KeyResultUpdateInput, ObjectiveCreateInput, ObjectiveFilter,
    ObjectiveStatus, ObjectiveUpdateInput,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::extract::{Json, Path, Query};
use crate::pagination::{Page, PageQuery};
use crate::response::{created_or_internal_error, ok_or_internal_error};
use crate::state::DbState;

pub async fn list_objectives(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Query(filter): Query<ObjectiveFilter>,
    Query(pagination): Query<PageQuery>,
) -> impl IntoResponse {
    info!("Listing objectives (page: {})", pagination.page());

    let result = db
        .objective_storage
        .list_objectives_paginated(&filter, Some(pagination.limit()), Some(pagination.offset()))
        .await
        .map(|(objectives, total)| Page::new(objectives, &pagination, total));

    ok_or_internal_error(result, "Failed to list objectives")
}

pub async fn get_objective(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let result = db.objective_storage.get_objective(&id).await;
    ok_or_internal_error(result, "Failed to get objective")
}

/// Create an objective owned by the signed-in user
pub async fn create_objective(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<ObjectiveCreateInput>,
) -> impl IntoResponse {
    info!("Creating objective '{}' for {}", input.title.trim(), current_user.id());

    let result = db
        .objective_storage
        .create_objective(current_user.id(), input)
        .await;
    created_or_internal_error(result, "Failed to create objective")
}

pub async fn update_objective(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<ObjectiveUpdateInput>,
) -> impl IntoResponse {
    info!("Updating objective: {}", id);

    let result = db.objective_storage.update_objective(&id, input).await;
    ok_or_internal_error(result, "Failed to update objective")
}

pub async fn delete_objective(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting objective: {}", id);

    let result = db
        .objective_storage
        .delete_objective(&id)
        .await
        .map(|_| serde_json::json!({ "deleted": true }));
    ok_or_internal_error(result, "Failed to delete objective")
}

pub async fn submit_objective(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("User {} submitting objective {} for approval", current_user.id(), id);

    let result = db
        .objective_storage
        .transition(&id, ObjectiveStatus::PendingApproval)
        .await;
    ok_or_internal_error(result, "Failed to submit objective")
}

pub async fn approve_objective(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    current_user.require_approver()?;
    info!("User {} approving objective {}", current_user.id(), id);

    let result = db
        .objective_storage
        .transition(&id, ObjectiveStatus::Approved)
        .await;
    Ok(ok_or_internal_error(result, "Failed to approve objective"))
}

pub async fn reject_objective(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    current_user.require_approver()?;
    info!("User {} rejecting objective {}", current_user.id(), id);

    let result = db
        .objective_storage
        .transition(&id, ObjectiveStatus::Rejected)
        .await;
    Ok(ok_or_internal_error(result, "Failed to reject objective"))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ObjectiveStatus,
}

/// Record how an approved objective is tracking
pub async fn update_objective_status(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Response> {
    if !request.status.is_tracking() {
        return Err(AppError::bad_request(
            "Status must be ON_TRACK, AT_RISK or BEHIND; use submit, approve or reject for the approval workflow",
        ));
    }
    info!("Objective {} now {}", id, request.status);

    let result = db.objective_storage.transition(&id, request.status).await;
    Ok(ok_or_internal_error(result, "Failed to update objective status"))
}

pub async fn add_key_result(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<KeyResultCreateInput>,
) -> impl IntoResponse {
    info!("Adding key result '{}' to objective {}", input.title.trim(), id);

    let result = db.objective_storage.add_key_result(&id, input).await;
    created_or_internal_error(result, "Failed to add key result")
}

pub async fn update_key_result(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path((id, key_result_id)): Path<(String, String)>,
    Json(input): Json<KeyResultUpdateInput>,
) -> impl IntoResponse {
    info!("Updating key result {} of objective {}", key_result_id, id);

    let result = db
        .objective_storage
        .update_key_result(&id, &key_result_id, input)
        .await;
    ok_or_internal_error(result, "Failed to update key result")
}

pub async fn remove_key_result(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path((id, key_result_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("Removing key result {} from objective {}", key_result_id, id);

    let result = db
        .objective_storage
        .remove_key_result(&id, &key_result_id)
        .await;
    ok_or_internal_error(result, "Failed to remove key result")
}
