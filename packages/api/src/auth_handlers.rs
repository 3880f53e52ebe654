// ABOUTME: HTTP request handlers for sign-in, sign-out, and the current user
// ABOUTME: Issues bearer session tokens against stored password hashes

use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use okrdesk_core::PublicUser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::extract::Json;
use crate::response::{ok_or_internal_error, ApiResponse};
use crate::state::DbState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: PublicUser,
}

pub async fn login(
    State(db): State<DbState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = match db
        .user_storage
        .authenticate(&request.email, &request.password)
        .await?
    {
        Some(user) => user,
        None => {
            warn!("Failed sign-in attempt for {}", request.email.trim());
            return Err(AppError::Unauthorized);
        }
    };

    let issued = db.session_storage.create_session(&user.id, db.session_ttl).await?;
    info!("User {} signed in", user.id);

    Ok(Json(ApiResponse::success(LoginResponse {
        token: issued.token,
        expires_at: issued.session.expires_at,
        user: user.into(),
    })))
}

pub async fn logout(State(db): State<DbState>, current_user: CurrentUser) -> impl IntoResponse {
    info!("User {} signing out", current_user.id());

    let result = db
        .session_storage
        .delete_session(&current_user.token)
        .await
        .map(|_| serde_json::json!({ "signedOut": true }));
    ok_or_internal_error(result, "Failed to sign out")
}

pub async fn me(current_user: CurrentUser) -> Json<ApiResponse<PublicUser>> {
    Json(ApiResponse::success(current_user.user))
}
