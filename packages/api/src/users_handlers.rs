// ABOUTME: HTTP request handlers for user accounts
// ABOUTME: Listing is open to any signed-in user, changes require an administrator

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use okrdesk_core::{PublicUser, UserCreateInput, UserFilter, UserUpdateInput};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::extract::{Json, Path, Query};
use crate::pagination::{Page, PageQuery};
use crate::response::{created_or_internal_error, ok_or_internal_error};
use crate::state::DbState;

pub async fn list_users(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Query(filter): Query<UserFilter>,
    Query(pagination): Query<PageQuery>,
) -> impl IntoResponse {
    info!("Listing users (page: {})", pagination.page());

    let result = db
        .user_storage
        .list_users_paginated(&filter, Some(pagination.limit()), Some(pagination.offset()))
        .await
        .map(|(users, total)| {
            Page::new(users, &pagination, total).map(PublicUser::from)
        });

    ok_or_internal_error(result, "Failed to list users")
}

pub async fn get_user(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let result = db.user_storage.get_user(&user_id).await.map(PublicUser::from);
    ok_or_internal_error(result, "Failed to get user")
}

pub async fn create_user(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<UserCreateInput>,
) -> ApiResult<Response> {
    current_user.require_admin()?;
    info!("Creating user '{}'", input.email.trim());

    let result = db.user_storage.create_user(input).await.map(PublicUser::from);
    Ok(created_or_internal_error(result, "Failed to create user"))
}

pub async fn update_user(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(user_id): Path<String>,
    Json(input): Json<UserUpdateInput>,
) -> ApiResult<Response> {
    current_user.require_admin()?;
    info!("Updating user: {}", user_id);

    let result = db
        .user_storage
        .update_user(&user_id, input)
        .await
        .map(PublicUser::from);
    Ok(ok_or_internal_error(result, "Failed to update user"))
}

pub async fn delete_user(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    current_user.require_admin()?;
    if user_id == current_user.id() {
        return Err(AppError::bad_request("You cannot delete your own account"));
    }
    info!("Deleting user: {}", user_id);

    let result = db
        .user_storage
        .delete_user(&user_id)
        .await
        .map(|_| serde_json::json!({ "deleted": true }));
    Ok(ok_or_internal_error(result, "Failed to delete user"))
}
