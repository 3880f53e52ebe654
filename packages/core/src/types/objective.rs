// ABOUTME: Objective and key result type definitions
// ABOUTME: Quarterly goals, their approval lifecycle, and measurable key results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    OnTrack,
    AtRisk,
    Behind,
}

impl ObjectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveStatus::Draft => "DRAFT",
            ObjectiveStatus::PendingApproval => "PENDING_APPROVAL",
            ObjectiveStatus::Approved => "APPROVED",
            ObjectiveStatus::Rejected => "REJECTED",
            ObjectiveStatus::OnTrack => "ON_TRACK",
            ObjectiveStatus::AtRisk => "AT_RISK",
            ObjectiveStatus::Behind => "BEHIND",
        }
    }

    /// Statuses an objective is in once it has been approved and is being tracked
    pub fn is_tracking(&self) -> bool {
        matches!(
            self,
            ObjectiveStatus::OnTrack | ObjectiveStatus::AtRisk | ObjectiveStatus::Behind
        )
    }

    /// Whether the approval workflow allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: ObjectiveStatus) -> bool {
        use ObjectiveStatus::*;

        match (self, next) {
            (Draft, PendingApproval) | (Rejected, PendingApproval) => true,
            (PendingApproval, Approved) | (PendingApproval, Rejected) => true,
            (Approved, n) if n.is_tracking() => true,
            (s, n) if s.is_tracking() && n.is_tracking() => true,
            _ => false,
        }
    }
}

impl fmt::Display for ObjectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResult {
    pub id: String,
    pub objective_id: String,
    pub title: String,
    pub current_value: f64,
    pub target_value: f64,
    pub unit: Option<String>,
    pub progress: f64,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: String,
    /// Snapshot of the owner's name when the objective was written
    pub owner_name: String,
    pub department: Option<String>,
    pub quarter: i32,
    pub year: i32,
    pub status: ObjectiveStatus,
    pub progress: f64,
    pub key_results: Vec<KeyResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResultCreateInput {
    pub title: String,
    #[serde(default)]
    pub current_value: Option<f64>,
    pub target_value: f64,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResultUpdateInput {
    pub title: Option<String>,
    pub current_value: Option<f64>,
    pub target_value: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveCreateInput {
    pub title: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub quarter: i32,
    pub year: i32,
    #[serde(default)]
    pub key_results: Vec<KeyResultCreateInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveUpdateInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub quarter: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveFilter {
    pub owner_id: Option<String>,
    pub department: Option<String>,
    pub status: Option<ObjectiveStatus>,
    pub quarter: Option<i32>,
    pub year: Option<i32>,
}
