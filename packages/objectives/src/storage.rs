// ABOUTME: Objective storage layer using SQLite
// ABOUTME: Objectives with ordered key results, derived progress, and approval transitions

use okrdesk_core::validation::{
    validate_key_result_create, validate_key_result_update, validate_objective_create,
    validate_objective_update,
};
use okrdesk_core::{
    compute_progress, generate_id, mean_progress, KeyResult, KeyResultCreateInput,
    KeyResultUpdateInput, Objective, ObjectiveCreateInput, ObjectiveFilter, ObjectiveStatus,
    ObjectiveUpdateInput,
};
use okrdesk_storage::{StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

pub struct ObjectiveStorage {
    pool: SqlitePool,
}

impl ObjectiveStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_objectives(&self, filter: &ObjectiveFilter) -> StorageResult<Vec<Objective>> {
        let (objectives, _) = self.list_objectives_paginated(filter, None, None).await?;
        Ok(objectives)
    }

    pub async fn list_objectives_paginated(
        &self,
        filter: &ObjectiveFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> StorageResult<(Vec<Objective>, i64)> {
        debug!(
            "Listing objectives (filter: {:?}, limit: {:?}, offset: {:?})",
            filter, limit, offset
        );

        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;

        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM objectives WHERE 1 = 1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM objectives WHERE 1 = 1");
        push_filter(&mut query, filter);
        query.push(" ORDER BY year DESC, quarter DESC, created_at DESC");
        if let Some(lim) = limit {
            query.push(" LIMIT ").push_bind(lim);
            if let Some(off) = offset {
                query.push(" OFFSET ").push_bind(off);
            }
        }

        let rows = query
            .build()
            .fetch_all(&mut *conn)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut objectives = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut objective = row_to_objective(row)?;
            objective.key_results = load_key_results(&mut *conn, &objective.id).await?;
            objectives.push(objective);
        }

        Ok((objectives, total))
    }

    pub async fn get_objective(&self, id: &str) -> StorageResult<Objective> {
        debug!("Fetching objective: {}", id);
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        load_objective(&mut *conn, id).await
    }

    /// Create an objective owned by `owner_id`, together with its initial key results
    pub async fn create_objective(
        &self,
        owner_id: &str,
        input: ObjectiveCreateInput,
    ) -> StorageResult<Objective> {
        StorageError::check(validate_objective_create(&input))?;

        let id = generate_id("obj");
        debug!("Creating objective: {} for owner: {}", id, owner_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let owner_name = user_name(&mut *tx, owner_id).await?;

        sqlx::query(
            r#"
            INSERT INTO objectives (id, title, description, owner_id, owner_name, department, quarter, year, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(owner_id)
        .bind(&owner_name)
        .bind(&input.department)
        .bind(input.quarter)
        .bind(input.year)
        .bind(ObjectiveStatus::default())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::from_write(e, || already_exists(&id)))?;

        for (position, kr) in input.key_results.iter().enumerate() {
            insert_key_result(&mut *tx, &id, kr, position as i32).await?;
        }
        refresh_progress(&mut *tx, &id).await?;

        let objective = load_objective(&mut *tx, &id).await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!(
            "Created objective {} with {} key results",
            objective.id,
            objective.key_results.len()
        );
        Ok(objective)
    }

    pub async fn update_objective(
        &self,
        id: &str,
        input: ObjectiveUpdateInput,
    ) -> StorageResult<Objective> {
        debug!("Updating objective: {}", id);
        StorageError::check(validate_objective_update(&input))?;

        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "UPDATE objectives SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        );
        if let Some(title) = &input.title {
            query_builder.push(", title = ").push_bind(title.trim().to_string());
        }
        if let Some(description) = &input.description {
            query_builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(department) = &input.department {
            query_builder.push(", department = ").push_bind(department.clone());
        }
        if let Some(quarter) = input.quarter {
            query_builder.push(", quarter = ").push_bind(quarter);
        }
        if let Some(year) = input.year {
            query_builder.push(", year = ").push_bind(year);
        }
        query_builder.push(" WHERE id = ").push_bind(id);

        let result = query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::from_write(e, || already_exists(id)))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Objective {}", id)));
        }

        self.get_objective(id).await
    }

    /// Delete an objective; its key results go with it
    pub async fn delete_objective(&self, id: &str) -> StorageResult<()> {
        debug!("Deleting objective: {}", id);

        let result = sqlx::query("DELETE FROM objectives WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Objective {}", id)));
        }
        Ok(())
    }

    /// Move an objective to `next`, refusing moves the approval workflow does not allow
    pub async fn transition(&self, id: &str, next: ObjectiveStatus) -> StorageResult<Objective> {
        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let current: ObjectiveStatus = sqlx::query_scalar("SELECT status FROM objectives WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Objective {}", id)))?;

        if !current.can_transition_to(next) {
            return Err(StorageError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        sqlx::query(
            "UPDATE objectives SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
        )
        .bind(next)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        let objective = load_objective(&mut *tx, id).await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!("Objective {} moved from {} to {}", id, current, next);
        Ok(objective)
    }

    pub async fn add_key_result(
        &self,
        objective_id: &str,
        input: KeyResultCreateInput,
    ) -> StorageResult<Objective> {
        StorageError::check(validate_key_result_create(&input))?;

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;
        ensure_objective(&mut *tx, objective_id).await?;

        let position: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM key_results WHERE objective_id = ?",
        )
        .bind(objective_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        insert_key_result(&mut *tx, objective_id, &input, position).await?;
        refresh_progress(&mut *tx, objective_id).await?;

        let objective = load_objective(&mut *tx, objective_id).await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;
        Ok(objective)
    }

    pub async fn update_key_result(
        &self,
        objective_id: &str,
        key_result_id: &str,
        input: KeyResultUpdateInput,
    ) -> StorageResult<Objective> {
        StorageError::check(validate_key_result_update(&input))?;
        debug!("Updating key result {} of {}", key_result_id, objective_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let row = sqlx::query("SELECT * FROM key_results WHERE id = ? AND objective_id = ?")
            .bind(key_result_id)
            .bind(objective_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Key result {}", key_result_id)))?;
        let existing = row_to_key_result(&row)?;

        let title = input
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or(existing.title);
        let current_value = input.current_value.unwrap_or(existing.current_value);
        let target_value = input.target_value.unwrap_or(existing.target_value);
        let unit = input.unit.or(existing.unit);
        let progress = compute_progress(current_value, target_value);

        sqlx::query(
            r#"
            UPDATE key_results
            SET title = ?, current_value = ?, target_value = ?, unit = ?, progress = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(current_value)
        .bind(target_value)
        .bind(&unit)
        .bind(progress)
        .bind(key_result_id)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        refresh_progress(&mut *tx, objective_id).await?;

        let objective = load_objective(&mut *tx, objective_id).await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;
        Ok(objective)
    }

    pub async fn remove_key_result(
        &self,
        objective_id: &str,
        key_result_id: &str,
    ) -> StorageResult<Objective> {
        debug!("Removing key result {} from {}", key_result_id, objective_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let result = sqlx::query("DELETE FROM key_results WHERE id = ? AND objective_id = ?")
            .bind(key_result_id)
            .bind(objective_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Key result {}", key_result_id)));
        }

        refresh_progress(&mut *tx, objective_id).await?;

        let objective = load_objective(&mut *tx, objective_id).await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;
        Ok(objective)
    }
}

fn already_exists(id: &str) -> StorageError {
    StorageError::ConstraintViolation(format!("Objective {} already exists", id))
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &ObjectiveFilter) {
    if let Some(owner_id) = &filter.owner_id {
        query.push(" AND owner_id = ").push_bind(owner_id.clone());
    }
    if let Some(department) = &filter.department {
        query.push(" AND department = ").push_bind(department.clone());
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
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

async fn ensure_objective(conn: &mut SqliteConnection, id: &str) -> StorageResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM objectives WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    exists
        .map(|_| ())
        .ok_or_else(|| StorageError::NotFound(format!("Objective {}", id)))
}

async fn insert_key_result(
    conn: &mut SqliteConnection,
    objective_id: &str,
    input: &KeyResultCreateInput,
    position: i32,
) -> StorageResult<()> {
    let id = generate_id("kr");
    let current_value = input.current_value.unwrap_or(0.0);
    let progress = compute_progress(current_value, input.target_value);

    sqlx::query(
        r#"
        INSERT INTO key_results (id, objective_id, title, current_value, target_value, unit, progress, position)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(objective_id)
    .bind(input.title.trim())
    .bind(current_value)
    .bind(input.target_value)
    .bind(&input.unit)
    .bind(progress)
    .bind(position)
    .execute(&mut *conn)
    .await
    .map_err(StorageError::Sqlx)?;

    Ok(())
}

/// Recompute an objective's progress as the mean of its key results
async fn refresh_progress(conn: &mut SqliteConnection, objective_id: &str) -> StorageResult<f64> {
    let values: Vec<f64> = sqlx::query_scalar("SELECT progress FROM key_results WHERE objective_id = ?")
        .bind(objective_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    let progress = mean_progress(values);

    sqlx::query(
        "UPDATE objectives SET progress = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
    )
    .bind(progress)
    .bind(objective_id)
    .execute(&mut *conn)
    .await
    .map_err(StorageError::Sqlx)?;

    Ok(progress)
}

async fn load_key_results(
    conn: &mut SqliteConnection,
    objective_id: &str,
) -> StorageResult<Vec<KeyResult>> {
    let rows = sqlx::query(
        "SELECT * FROM key_results WHERE objective_id = ? ORDER BY position, created_at",
    )
    .bind(objective_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(StorageError::Sqlx)?;

    rows.iter().map(row_to_key_result).collect()
}

async fn load_objective(conn: &mut SqliteConnection, id: &str) -> StorageResult<Objective> {
    let row = sqlx::query("SELECT * FROM objectives WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?
        .ok_or_else(|| StorageError::NotFound(format!("Objective {}", id)))?;

    let mut objective = row_to_objective(&row)?;
    objective.key_results = load_key_results(conn, id).await?;
    Ok(objective)
}

fn row_to_objective(row: &SqliteRow) -> StorageResult<Objective> {
    Ok(Objective {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        title: row.try_get("title").map_err(StorageError::Sqlx)?,
        description: row.try_get("description").map_err(StorageError::Sqlx)?,
        owner_id: row.try_get("owner_id").map_err(StorageError::Sqlx)?,
        owner_name: row.try_get("owner_name").map_err(StorageError::Sqlx)?,
        department: row.try_get("department").map_err(StorageError::Sqlx)?,
        quarter: row.try_get("quarter").map_err(StorageError::Sqlx)?,
        year: row.try_get("year").map_err(StorageError::Sqlx)?,
        status: row.try_get("status").map_err(StorageError::Sqlx)?,
        progress: row.try_get("progress").map_err(StorageError::Sqlx)?,
        key_results: Vec::new(),
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}

fn row_to_key_result(row: &SqliteRow) -> StorageResult<KeyResult> {
    Ok(KeyResult {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        objective_id: row.try_get("objective_id").map_err(StorageError::Sqlx)?,
        title: row.try_get("title").map_err(StorageError::Sqlx)?,
        current_value: row.try_get("current_value").map_err(StorageError::Sqlx)?,
        target_value: row.try_get("target_value").map_err(StorageError::Sqlx)?,
        unit: row.try_get("unit").map_err(StorageError::Sqlx)?,
        progress: row.try_get("progress").map_err(StorageError::Sqlx)?,
        position: row.try_get("position").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
