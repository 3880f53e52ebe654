// ABOUTME: Department storage layer using SQLite
// ABOUTME: CRUD for departments, with member counts derived from user records

use okrdesk_core::validation::validate_department_name;
use okrdesk_core::{generate_id, Department, DepartmentCreateInput, DepartmentUpdateInput};
use okrdesk_storage::{StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

const SELECT_DEPARTMENT: &str = r#"
    SELECT
        d.*,
        (SELECT COUNT(*) FROM users u WHERE u.department = d.name COLLATE NOCASE) AS member_count
    FROM departments d
"#;

pub struct DepartmentStorage {
    pool: SqlitePool,
}

impl DepartmentStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_departments(&self) -> StorageResult<Vec<Department>> {
        let (departments, _) = self.list_departments_paginated(None, None).await?;
        Ok(departments)
    }

    pub async fn list_departments_paginated(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> StorageResult<(Vec<Department>, i64)> {
        debug!("Listing departments (limit: {:?}, offset: {:?})", limit, offset);

        let total = self.count_departments().await?;

        let mut query = QueryBuilder::<Sqlite>::new(SELECT_DEPARTMENT);
        query.push(" ORDER BY d.name COLLATE NOCASE");
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

        let departments = rows
            .iter()
            .map(row_to_department)
            .collect::<StorageResult<Vec<_>>>()?;
        Ok((departments, total))
    }

    /// Number of stored departments. Used by the connectivity diagnostic.
    pub async fn count_departments(&self) -> StorageResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM departments")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }

    pub async fn get_department(&self, id: &str) -> StorageResult<Department> {
        debug!("Fetching department: {}", id);

        let row = sqlx::query(&format!("{} WHERE d.id = ?", SELECT_DEPARTMENT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Department {}", id)))?;

        row_to_department(&row)
    }

    pub async fn find_by_name(&self, name: &str) -> StorageResult<Option<Department>> {
        let row = sqlx::query(&format!("{} WHERE d.name = ?", SELECT_DEPARTMENT))
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_department).transpose()
    }

    pub async fn create_department(&self, input: DepartmentCreateInput) -> StorageResult<Department> {
        StorageError::check(validate_department_name(&input.name))?;

        let id = generate_id("dep");
        let name = input.name.trim().to_string();
        debug!("Creating department: {} ({})", name, id);

        sqlx::query("INSERT INTO departments (id, name, head_id) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&name)
            .bind(&input.head_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::from_write(e, || StorageError::DuplicateName(name.clone())))?;

        self.get_department(&id).await
    }

    pub async fn update_department(
        &self,
        id: &str,
        input: DepartmentUpdateInput,
    ) -> StorageResult<Department> {
        debug!("Updating department: {}", id);

        let name = input.name.as_deref().map(|n| n.trim().to_string());
        if let Some(name) = &name {
            StorageError::check(validate_department_name(name))?;
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "UPDATE departments SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        );
        if let Some(name) = &name {
            query_builder.push(", name = ").push_bind(name.clone());
        }
        if let Some(head_id) = &input.head_id {
            query_builder.push(", head_id = ").push_bind(head_id.clone());
        }
        query_builder.push(" WHERE id = ").push_bind(id);

        let result = query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::from_write(e, || {
                    StorageError::DuplicateName(name.clone().unwrap_or_default())
                })
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Department {}", id)));
        }

        self.get_department(id).await
    }

    pub async fn delete_department(&self, id: &str) -> StorageResult<()> {
        debug!("Deleting department: {}", id);

        let result = sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Department {}", id)));
        }
        Ok(())
    }
}

fn row_to_department(row: &SqliteRow) -> StorageResult<Department> {
    Ok(Department {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        name: row.try_get("name").map_err(StorageError::Sqlx)?,
        head_id: row.try_get("head_id").map_err(StorageError::Sqlx)?,
        member_count: row.try_get("member_count").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
