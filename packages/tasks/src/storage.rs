// ABOUTME: SQLite persistence for tasks
// ABOUTME: Handles CRUD for tasks with assignee and key result name snapshots

use okrdesk_core::validation::{validate_task_create, validate_task_update};
use okrdesk_core::{generate_id, Task, TaskCreateInput, TaskFilter, TaskUpdateInput};
use okrdesk_storage::{StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

pub struct TaskStorage {
    pool: SqlitePool,
}

impl TaskStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> StorageResult<Vec<Task>> {
        let (tasks, _) = self.list_tasks_paginated(filter, None, None).await?;
        Ok(tasks)
    }

    pub async fn list_tasks_paginated(
        &self,
        filter: &TaskFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> StorageResult<(Vec<Task>, i64)> {
        debug!(
            "Fetching tasks (filter: {:?}, limit: {:?}, offset: {:?})",
            filter, limit, offset
        );

        // Get total count
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tasks WHERE 1 = 1");
        push_filter(&mut count_query, filter);
        let count: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM tasks WHERE 1 = 1");
        push_filter(&mut query, filter);
        // Undated tasks sort last
        query.push(" ORDER BY due_date IS NULL, due_date, created_at");
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

        let tasks = rows.iter().map(row_to_task).collect::<StorageResult<Vec<_>>>()?;
        Ok((tasks, count))
    }

    pub async fn get_task(&self, task_id: &str) -> StorageResult<Task> {
        debug!("Fetching task: {}", task_id);

        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Task {}", task_id)))?;

        row_to_task(&row)
    }

    pub async fn create_task(&self, input: TaskCreateInput) -> StorageResult<Task> {
        StorageError::check(validate_task_create(&input))?;

        let task_id = generate_id("task");
        let status = input.status.unwrap_or_default();
        let priority = input.priority.unwrap_or_default();

        debug!("Creating task: {}", task_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let assignee_name = match &input.assignee_id {
            Some(id) => Some(user_name(&mut *tx, id).await?),
            None => None,
        };
        let kr_title = match &input.key_result_id {
            Some(id) => Some(key_result_title(&mut *tx, id).await?),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, title, description, status, priority,
                assignee_id, assignee_name, key_result_id, key_result_title, due_date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(status)
        .bind(priority)
        .bind(&input.assignee_id)
        .bind(&assignee_name)
        .bind(&input.key_result_id)
        .bind(&kr_title)
        .bind(input.due_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            StorageError::from_write(e, || {
                StorageError::ConstraintViolation(format!("Task {} already exists", task_id))
            })
        })?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.get_task(&task_id).await
    }

    /// Apply the given changes. An empty `assigneeId` or `keyResultId` clears the link.
    pub async fn update_task(&self, task_id: &str, input: TaskUpdateInput) -> StorageResult<Task> {
        debug!("Updating task: {}", task_id);
        StorageError::check(validate_task_update(&input))?;

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        // SQL injection safety: column names are literals, values go through push_bind
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "UPDATE tasks SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        );

        if let Some(title) = &input.title {
            query_builder.push(", title = ").push_bind(title.trim().to_string());
        }
        if let Some(description) = &input.description {
            query_builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = input.status {
            query_builder.push(", status = ").push_bind(status);
        }
        if let Some(priority) = input.priority {
            query_builder.push(", priority = ").push_bind(priority);
        }
        if let Some(assignee_id) = &input.assignee_id {
            let (id, name) = if assignee_id.is_empty() {
                (None, None)
            } else {
                (Some(assignee_id.clone()), Some(user_name(&mut *tx, assignee_id).await?))
            };
            query_builder.push(", assignee_id = ").push_bind(id);
            query_builder.push(", assignee_name = ").push_bind(name);
        }
        if let Some(key_result_id) = &input.key_result_id {
            let (id, title) = if key_result_id.is_empty() {
                (None, None)
            } else {
                (
                    Some(key_result_id.clone()),
                    Some(key_result_title(&mut *tx, key_result_id).await?),
                )
            };
            query_builder.push(", key_result_id = ").push_bind(id);
            query_builder.push(", key_result_title = ").push_bind(title);
        }
        if let Some(due_date) = input.due_date {
            query_builder.push(", due_date = ").push_bind(due_date);
        }

        query_builder.push(" WHERE id = ").push_bind(task_id);

        let result = query_builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Task {}", task_id)));
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.get_task(task_id).await
    }

    pub async fn delete_task(&self, task_id: &str) -> StorageResult<()> {
        debug!("Deleting task: {}", task_id);

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Task {}", task_id)));
        }
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &TaskFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(assignee_id) = &filter.assignee_id {
        query.push(" AND assignee_id = ").push_bind(assignee_id.clone());
    }
    if let Some(key_result_id) = &filter.key_result_id {
        query.push(" AND key_result_id = ").push_bind(key_result_id.clone());
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

async fn key_result_title(conn: &mut SqliteConnection, key_result_id: &str) -> StorageResult<String> {
    sqlx::query_scalar("SELECT title FROM key_results WHERE id = ?")
        .bind(key_result_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?
        .ok_or_else(|| StorageError::NotFound(format!("Key result {}", key_result_id)))
}

fn row_to_task(row: &SqliteRow) -> StorageResult<Task> {
    Ok(Task {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        title: row.try_get("title").map_err(StorageError::Sqlx)?,
        description: row.try_get("description").map_err(StorageError::Sqlx)?,
        status: row.try_get("status").map_err(StorageError::Sqlx)?,
        priority: row.try_get("priority").map_err(StorageError::Sqlx)?,
        assignee_id: row.try_get("assignee_id").map_err(StorageError::Sqlx)?,
        assignee_name: row.try_get("assignee_name").map_err(StorageError::Sqlx)?,
        key_result_id: row.try_get("key_result_id").map_err(StorageError::Sqlx)?,
        key_result_title: row.try_get("key_result_title").map_err(StorageError::Sqlx)?,
        due_date: row.try_get("due_date").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
