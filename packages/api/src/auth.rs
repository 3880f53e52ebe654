// ABOUTME: Authenticated user extractor for API handlers
// ABOUTME: Resolves the bearer session token to the signed-in user and checks roles

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use okrdesk_core::{PublicUser, Role};
use okrdesk_storage::StorageError;
use tracing::debug;

use crate::error::AppError;
use crate::state::DbState;

/// Current authenticated user
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: PublicUser,
    /// Raw bearer token the request was made with
    pub token: String,
}

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// User and department administration
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role().can_administer() {
            Ok(())
        } else {
            Err(AppError::forbidden("Administrator role required"))
        }
    }

    /// Approving or rejecting submitted objectives
    pub fn require_approver(&self) -> Result<(), AppError> {
        if self.role().can_approve() {
            Ok(())
        } else {
            Err(AppError::forbidden("Manager or administrator role required"))
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

impl FromRequestParts<DbState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &DbState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or(AppError::Unauthorized)?
            .to_string();

        let session = state
            .session_storage
            .verify_token(&token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = match state.user_storage.get_user(&session.user_id).await {
            Ok(user) => user,
            Err(StorageError::NotFound(_)) => return Err(AppError::Unauthorized),
            Err(e) => return Err(e.into()),
        };

        debug!("Authenticated request for user {}", user.id);
        Ok(Self {
            user: user.into(),
            token,
        })
    }
}
