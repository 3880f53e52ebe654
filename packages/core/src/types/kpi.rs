// ABOUTME: KPI type definitions
// ABOUTME: Departmental and personal metrics with target tracking and lifecycle status

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KpiType {
    #[default]
    Department,
    Personal,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KpiStatus {
    #[default]
    Active,
    Completed,
    Overdue,
}

impl KpiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiStatus::Active => "ACTIVE",
            KpiStatus::Completed => "COMPLETED",
            KpiStatus::Overdue => "OVERDUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kpi_type: KpiType,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,
    pub progress: f64,
    pub status: KpiStatus,
    pub department: Option<String>,

    // Personal assignment, with name snapshots taken at write time
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub assigned_by_id: Option<String>,
    pub assigned_by_name: Option<String>,

    pub objective_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quarter: i32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCreateInput {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kpi_type: Option<KpiType>,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub department: Option<String>,
    pub assignee_id: Option<String>,
    pub objective_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Derived from `start_date` when omitted
    pub quarter: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiUpdateInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub status: Option<KpiStatus>,
    pub department: Option<String>,
    pub assignee_id: Option<String>,
    pub objective_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiFilter {
    #[serde(rename = "type")]
    pub kpi_type: Option<KpiType>,
    pub status: Option<KpiStatus>,
    pub department: Option<String>,
    pub assignee_id: Option<String>,
    pub quarter: Option<i32>,
    pub year: Option<i32>,
}
