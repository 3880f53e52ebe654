// ABOUTME: KPI storage layer using SQLite
// ABOUTME: CRUD with derived progress, completion on target, and overdue marking

use chrono::{Datelike, NaiveDate, Utc};
use okrdesk_core::validation::{validate_kpi_create, validate_kpi_update};
use okrdesk_core::{
    compute_progress, generate_id, quarter_of, Kpi, KpiCreateInput, KpiFilter, KpiStatus,
    KpiUpdateInput, ValidationError,
};
use okrdesk_storage::{StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Status a KPI should carry after a write.
///
/// Reaching the target always completes it. Otherwise an explicitly requested
/// status wins, and a completed KPI that fell back below target becomes active.
pub fn status_for(progress: f64, requested: Option<KpiStatus>, previous: KpiStatus) -> KpiStatus {
    if progress >= 100.0 {
        return KpiStatus::Completed;
    }
    match (requested, previous) {
        (Some(status), _) => status,
        (None, KpiStatus::Completed) => KpiStatus::Active,
        (None, status) => status,
    }
}

/// An overdue KPI whose end date is `today` or later is active again
pub fn reopen_if_extended(status: KpiStatus, end_date: NaiveDate, today: NaiveDate) -> KpiStatus {
    match status {
        KpiStatus::Overdue if end_date >= today => KpiStatus::Active,
        status => status,
    }
}

pub struct KpiStorage {
    pool: SqlitePool,
}

impl KpiStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_kpis(&self, filter: &KpiFilter) -> StorageResult<Vec<Kpi>> {
        let (kpis, _) = self.list_kpis_paginated(filter, None, None).await?;
        Ok(kpis)
    }

    pub async fn list_kpis_paginated(
        &self,
        filter: &KpiFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> StorageResult<(Vec<Kpi>, i64)> {
        debug!(
            "Listing KPIs (filter: {:?}, limit: {:?}, offset: {:?})",
            filter, limit, offset
        );

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM kpis WHERE 1 = 1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM kpis WHERE 1 = 1");
        push_filter(&mut query, filter);
        query.push(" ORDER BY end_date, title COLLATE NOCASE");
        if let Some(lim) = limit {
            query.push(" LIMIT ").push_bind(lim);
            if let Some(off) = offset {
                query.push(" OFFSET ").push_bind(off);
            }
        }

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let kpis = rows.iter().map(row_to_kpi).collect::<StorageResult<Vec<_>>>()?;
        Ok((kpis, total))
    }

    pub async fn get_kpi(&self, id: &str) -> StorageResult<Kpi> {
        debug!("Fetching KPI: {}", id);
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        load_kpi(&mut *conn, id).await
    }

    /// Create a KPI on behalf of `assigned_by_id`
    pub async fn create_kpi(&self, assigned_by_id: &str, input: KpiCreateInput) -> StorageResult<Kpi> {
        StorageError::check(validate_kpi_create(&input))?;

        let id = generate_id("kpi");
        let current_value = input.current_value.unwrap_or(0.0);
        let progress = compute_progress(current_value, input.target_value);
        let status = status_for(progress, None, KpiStatus::Active);
        let quarter = input.quarter.unwrap_or_else(|| quarter_of(input.start_date));
        let year = input.year.unwrap_or_else(|| input.start_date.year());

        debug!("Creating KPI: {} assigned by {}", id, assigned_by_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let assigned_by_name = user_name(&mut *tx, assigned_by_id).await?;
        let assignee_name = match &input.assignee_id {
            Some(assignee_id) => Some(user_name(&mut *tx, assignee_id).await?),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO kpis (
                id, title, description, kpi_type, target_value, current_value, unit, progress,
                status, department, assignee_id, assignee_name, assigned_by_id, assigned_by_name,
                objective_id, start_date, end_date, quarter, year
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.kpi_type.unwrap_or_default())
        .bind(input.target_value)
        .bind(current_value)
        .bind(&input.unit)
        .bind(progress)
        .bind(status)
        .bind(&input.department)
        .bind(&input.assignee_id)
        .bind(&assignee_name)
        .bind(assigned_by_id)
        .bind(&assigned_by_name)
        .bind(&input.objective_id)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(quarter)
        .bind(year)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            StorageError::from_write(e, || {
                StorageError::ConstraintViolation(format!("KPI {} already exists", id))
            })
        })?;

        let kpi = load_kpi(&mut *tx, &id).await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;
        Ok(kpi)
    }

    /// Apply the given changes. Progress and status are re-derived from the result.
    pub async fn update_kpi(&self, id: &str, input: KpiUpdateInput) -> StorageResult<Kpi> {
        self.update_kpi_as_of(id, input, Utc::now().date_naive()).await
    }

    /// Update with `today` deciding whether an overdue KPI reopens
    pub async fn update_kpi_as_of(
        &self,
        id: &str,
        input: KpiUpdateInput,
        today: NaiveDate,
    ) -> StorageResult<Kpi> {
        debug!("Updating KPI: {}", id);
        StorageError::check(validate_kpi_update(&input))?;

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;
        let existing = load_kpi(&mut *tx, id).await?;

        let start_date = input.start_date.unwrap_or(existing.start_date);
        let end_date = input.end_date.unwrap_or(existing.end_date);
        if end_date < start_date {
            return Err(StorageError::Validation(vec![ValidationError::new(
                "endDate",
                "End date cannot be before start date",
            )]));
        }

        // The reporting period follows the start date only when the start date moves
        let (quarter, year) = match input.start_date {
            Some(start) => (quarter_of(start), start.year()),
            None => (existing.quarter, existing.year),
        };

        let current_value = input.current_value.unwrap_or(existing.current_value);
        let target_value = input.target_value.unwrap_or(existing.target_value);
        let progress = compute_progress(current_value, target_value);
        let mut status = status_for(progress, input.status, existing.status);
        if input.status.is_none() {
            status = reopen_if_extended(status, end_date, today);
        }

        let (assignee_id, assignee_name) = match &input.assignee_id {
            Some(assignee_id) if assignee_id.is_empty() => (None, None),
            Some(assignee_id) => (
                Some(assignee_id.clone()),
                Some(user_name(&mut *tx, assignee_id).await?),
            ),
            None => (existing.assignee_id, existing.assignee_name),
        };
        let objective_id = match input.objective_id {
            Some(objective_id) if objective_id.is_empty() => None,
            Some(objective_id) => Some(objective_id),
            None => existing.objective_id,
        };

        sqlx::query(
            r#"
            UPDATE kpis
            SET title = ?, description = ?, target_value = ?, current_value = ?, unit = ?,
                progress = ?, status = ?, department = ?, assignee_id = ?, assignee_name = ?,
                objective_id = ?, start_date = ?, end_date = ?, quarter = ?, year = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(input.title.map(|t| t.trim().to_string()).unwrap_or(existing.title))
        .bind(input.description.or(existing.description))
        .bind(target_value)
        .bind(current_value)
        .bind(input.unit.or(existing.unit))
        .bind(progress)
        .bind(status)
        .bind(input.department.or(existing.department))
        .bind(&assignee_id)
        .bind(&assignee_name)
        .bind(&objective_id)
        .bind(start_date)
        .bind(end_date)
        .bind(quarter)
        .bind(year)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            StorageError::from_write(e, || {
                StorageError::ConstraintViolation(format!("KPI {} conflicts", id))
            })
        })?;

        let kpi = load_kpi(&mut *tx, id).await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;

        if kpi.status != existing.status {
            info!("KPI {} moved from {} to {}", id, existing.status.as_str(), kpi.status.as_str());
        }
        Ok(kpi)
    }

    pub async fn delete_kpi(&self, id: &str) -> StorageResult<()> {
        debug!("Deleting KPI: {}", id);

        let result = sqlx::query("DELETE FROM kpis WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("KPI {}", id)));
        }
        Ok(())
    }

    /// Mark every active KPI whose end date is before `today` as overdue
    pub async fn refresh_overdue(&self, today: NaiveDate) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE kpis
            SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE status = ? AND end_date < ?
            "#,
        )
        .bind(KpiStatus::Overdue)
        .bind(KpiStatus::Active)
        .bind(today)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() > 0 {
            info!("Marked {} KPIs overdue as of {}", result.rows_affected(), today);
        }
        Ok(result.rows_affected())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &KpiFilter) {
    if let Some(kpi_type) = filter.kpi_type {
        query.push(" AND kpi_type = ").push_bind(kpi_type);
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(department) = &filter.department {
        query.push(" AND department = ").push_bind(department.clone());
    }
    if let Some(assignee_id) = &filter.assignee_id {
        query.push(" AND assignee_id = ").push_bind(assignee_id.clone());
    }
    if let Some(quarter) = filter.quarter {
        query.push(" AND quarter = ").push_bind(quarter);
    }
    if let Some(year) = filter.year {
        query.push(" AND year = ").push_bind(year);
    }
}

async fn user_name(conn: &mut SqliteConnection, user_id: &str) -> StorageResult<String> {
    sqlx::query_scalar("SELECT name FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?
        .ok_or_else(|| StorageError::NotFound(format!("User {}", user_id)))
}

async fn load_kpi(conn: &mut SqliteConnection, id: &str) -> StorageResult<Kpi> {
    let row = sqlx::query("SELECT * FROM kpis WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?
        .ok_or_else(|| StorageError::NotFound(format!("KPI {}", id)))?;

    row_to_kpi(&row)
}

fn row_to_kpi(row: &SqliteRow) -> StorageResult<Kpi> {
    Ok(Kpi {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        title: row.try_get("title").map_err(StorageError::Sqlx)?,
        description: row.try_get("description").map_err(StorageError::Sqlx)?,
        kpi_type: row.try_get("kpi_type").map_err(StorageError::Sqlx)?,
        target_value: row.try_get("target_value").map_err(StorageError::Sqlx)?,
        current_value: row.try_get("current_value").map_err(StorageError::Sqlx)?,
        unit: row.try_get("unit").map_err(StorageError::Sqlx)?,
        progress: row.try_get("progress").map_err(StorageError::Sqlx)?,
        status: row.try_get("status").map_err(StorageError::Sqlx)?,
        department: row.try_get("department").map_err(StorageError::Sqlx)?,
        assignee_id: row.try_get("assignee_id").map_err(StorageError::Sqlx)?,
        assignee_name: row.try_get("assignee_name").map_err(StorageError::Sqlx)?,
        assigned_by_id: row.try_get("assigned_by_id").map_err(StorageError::Sqlx)?,
        assigned_by_name: row.try_get("assigned_by_name").map_err(StorageError::Sqlx)?,
        objective_id: row.try_get("objective_id").map_err(StorageError::Sqlx)?,
        start_date: row.try_get("start_date").map_err(StorageError::Sqlx)?,
        end_date: row.try_get("end_date").map_err(StorageError::Sqlx)?,
        quarter: row.try_get("quarter").map_err(StorageError::Sqlx)?,
        year: row.try_get("year").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaching_target_completes() {
        assert_eq!(status_for(100.0, None, KpiStatus::Active), KpiStatus::Completed);
        assert_eq!(
            status_for(100.0, Some(KpiStatus::Active), KpiStatus::Overdue),
            KpiStatus::Completed
        );
    }

    #[test]
    fn test_requested_status_wins_below_target() {
        assert_eq!(
            status_for(40.0, Some(KpiStatus::Overdue), KpiStatus::Active),
            KpiStatus::Overdue
        );
    }

    #[test]
    fn test_completed_falls_back_to_active() {
        assert_eq!(status_for(80.0, None, KpiStatus::Completed), KpiStatus::Active);
        assert_eq!(status_for(80.0, None, KpiStatus::Overdue), KpiStatus::Overdue);
    }

    #[test]
    fn test_overdue_reopens_only_when_end_date_is_not_past() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        assert_eq!(reopen_if_extended(KpiStatus::Overdue, today, today), KpiStatus::Active);
        assert_eq!(reopen_if_extended(KpiStatus::Overdue, past, today), KpiStatus::Overdue);
        assert_eq!(reopen_if_extended(KpiStatus::Completed, past, today), KpiStatus::Completed);
    }
}
