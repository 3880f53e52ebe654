// ABOUTME: User account types
// ABOUTME: Accounts with a closed role enumeration and a password-free public view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Whether this role may create, edit, or delete users and departments
    pub fn can_administer(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may approve or reject submitted objectives
    pub fn can_approve(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "EMPLOYEE" => Ok(Role::Employee),
            other => Err(ValidationError::new(
                "role",
                format!("Unknown role '{}', expected ADMIN, MANAGER or EMPLOYEE", other),
            )),
        }
    }
}

/// Stored user record. Carries the password hash and must not be sent to clients.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub supervisor_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub supervisor_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            position: user.position,
            avatar: user.avatar,
            supervisor_id: user.supervisor_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateInput {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Omitted roles are stored as `EMPLOYEE`
    #[serde(default)]
    pub role: Option<Role>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub supervisor_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub supervisor_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub role: Option<Role>,
    pub department: Option<String>,
    pub supervisor_id: Option<String>,
}
