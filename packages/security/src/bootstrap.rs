// ABOUTME: First-run administrator account creation
// ABOUTME: Creates the configured admin once and leaves an existing account untouched

use okrdesk_config::AdminBootstrap;
use okrdesk_core::{Role, User, UserCreateInput};
use okrdesk_storage::StorageResult;
use tracing::info;

use crate::users::UserStorage;

#[derive(Debug)]
pub enum BootstrapOutcome {
    Created(User),
    AlreadyPresent(User),
}

impl BootstrapOutcome {
    pub fn user(&self) -> &User {
        match self {
            BootstrapOutcome::Created(user) | BootstrapOutcome::AlreadyPresent(user) => user,
        }
    }
}

/// Make sure an account exists for the configured administrator email
pub async fn ensure_admin(
    users: &UserStorage,
    admin: &AdminBootstrap,
) -> StorageResult<BootstrapOutcome> {
    if let Some(existing) = users.find_by_email(&admin.email).await? {
        info!("Administrator account {} already present", existing.email);
        return Ok(BootstrapOutcome::AlreadyPresent(existing));
    }

    let user = users
        .create_user(UserCreateInput {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            role: Some(Role::Admin),
            department: None,
            position: None,
            avatar: None,
            supervisor_id: None,
        })
        .await?;

    info!("Created administrator account {}", user.email);
    Ok(BootstrapOutcome::Created(user))
}
