// ABOUTME: Department type definitions
// ABOUTME: Organisational units with a head reference and member count

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub head_id: Option<String>,
    /// Number of users whose department matches this name
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCreateInput {
    pub name: String,
    pub head_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentUpdateInput {
    pub name: Option<String>,
    pub head_id: Option<String>,
}
