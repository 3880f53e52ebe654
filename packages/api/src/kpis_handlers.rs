// ABOUTME: HTTP request handlers for KPIs
// ABOUTME: CRUD with overdue marking refreshed before every listing

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use okrdesk_core::{KpiCreateInput, KpiFilter, KpiUpdateInput};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::pagination::{Page, PageQuery};
use crate::response::{created_or_internal_error, ok_or_internal_error};
use crate::state::DbState;

pub async fn list_kpis(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Query(filter): Query<KpiFilter>,
    Query(pagination): Query<PageQuery>,
) -> ApiResult<Response> {
    info!("Listing KPIs (page: {})", pagination.page());

    db.kpi_storage.refresh_overdue(Utc::now().date_naive()).await?;

    let result = db
        .kpi_storage
        .list_kpis_paginated(&filter, Some(pagination.limit()), Some(pagination.offset()))
        .await
        .map(|(kpis, total)| Page::new(kpis, &pagination, total));

    Ok(ok_or_internal_error(result, "Failed to list KPIs"))
}

pub async fn get_kpi(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let result = db.kpi_storage.get_kpi(&id).await;
    ok_or_internal_error(result, "Failed to get KPI")
}

/// Create a KPI assigned by the signed-in user
pub async fn create_kpi(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<KpiCreateInput>,
) -> impl IntoResponse {
    info!("Creating KPI '{}' assigned by {}", input.title.trim(), current_user.id());

    let result = db.kpi_storage.create_kpi(current_user.id(), input).await;
    created_or_internal_error(result, "Failed to create KPI")
}

pub async fn update_kpi(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<KpiUpdateInput>,
) -> impl IntoResponse {
    info!("Updating KPI: {}", id);

    let result = db.kpi_storage.update_kpi(&id, input).await;
    ok_or_internal_error(result, "Failed to update KPI")
}

pub async fn delete_kpi(
    State(db): State<DbState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting KPI: {}", id);

    let result = db
        .kpi_storage
        .delete_kpi(&id)
        .await
        .map(|_| serde_json::json!({ "deleted": true }));
    ok_or_internal_error(result, "Failed to delete KPI")
}
