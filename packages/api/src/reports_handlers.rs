// ABOUTME: Aggregated progress report across departments
// ABOUTME: Objective progress, KPI status counts, and task status counts for a period

use std::collections::BTreeMap;

use axum::extract::State;
use chrono::Utc;
use okrdesk_core::{
    mean_progress, Kpi, KpiFilter, KpiStatus, Objective, ObjectiveFilter, Task, TaskFilter,
    TaskStatus,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{Json, Query};
use crate::response::ApiResponse;
use crate::state::DbState;

/// Label for records without a department
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub quarter: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCounts {
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentReport {
    pub department: String,
    pub objective_count: usize,
    pub average_progress: f64,
    pub kpis: KpiCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub quarter: Option<i32>,
    pub year: Option<i32>,
    pub objective_count: usize,
    pub overall_progress: f64,
    pub departments: Vec<DepartmentReport>,
    pub tasks: TaskCounts,
}

/// Build the summary from already-filtered records. Departments are listed by name.
pub fn summarize(
    query: &ReportQuery,
    objectives: &[Objective],
    kpis: &[Kpi],
    tasks: &[Task],
) -> ReportSummary {
    #[derive(Default)]
    struct Bucket {
        progress: Vec<f64>,
        kpis: KpiCounts,
    }

    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
    let key = |department: &Option<String>| {
        department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(UNASSIGNED_DEPARTMENT)
            .to_string()
    };

    for objective in objectives {
        buckets
            .entry(key(&objective.department))
            .or_default()
            .progress
            .push(objective.progress);
    }

    for kpi in kpis {
        let counts = &mut buckets.entry(key(&kpi.department)).or_default().kpis;
        match kpi.status {
            KpiStatus::Active => counts.active += 1,
            KpiStatus::Completed => counts.completed += 1,
            KpiStatus::Overdue => counts.overdue += 1,
        }
    }

    let mut task_counts = TaskCounts::default();
    for task in tasks {
        match task.status {
            TaskStatus::Todo => task_counts.todo += 1,
            TaskStatus::InProgress => task_counts.in_progress += 1,
            TaskStatus::Done => task_counts.done += 1,
        }
    }

    let departments = buckets
        .into_iter()
        .map(|(department, bucket)| DepartmentReport {
            department,
            objective_count: bucket.progress.len(),
            average_progress: mean_progress(bucket.progress),
            kpis: bucket.kpis,
        })
        .collect();

    ReportSummary {
        quarter: query.quarter,
        year: query.year,
        objective_count: objectives.len(),
        overall_progress: mean_progress(objectives.iter().map(|o| o.progress)),
        departments,
        tasks: task_counts,
    }
}

/// Summary for the optional `quarter`/`year` period. Tasks carry no period and are always counted in full.
pub async fn summary(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<ApiResponse<ReportSummary>>> {
    info!(
        "Building report summary (quarter: {:?}, year: {:?})",
        query.quarter, query.year
    );

    db.kpi_storage.refresh_overdue(Utc::now().date_naive()).await?;

    let objectives = db
        .objective_storage
        .list_objectives(&ObjectiveFilter {
            quarter: query.quarter,
            year: query.year,
            ..Default::default()
        })
        .await?;
    let kpis = db
        .kpi_storage
        .list_kpis(&KpiFilter {
            quarter: query.quarter,
            year: query.year,
            ..Default::default()
        })
        .await?;
    let tasks = db.task_storage.list_tasks(&TaskFilter::default()).await?;

    Ok(Json(ApiResponse::success(summarize(
        &query,
        &objectives,
        &kpis,
        &tasks,
    ))))
}
