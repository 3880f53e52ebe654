// ABOUTME: SQLite persistence for user accounts
// ABOUTME: Handles CRUD and credential checks for user accounts

use okrdesk_core::validation::{validate_user_create, validate_user_update};
use okrdesk_core::{
    generate_id, normalize_email, Role, User, UserCreateInput, UserFilter, UserUpdateInput,
};
use okrdesk_storage::{StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::passwords::{hash_password, verify_password};

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, input: UserCreateInput) -> StorageResult<User> {
        StorageError::check(validate_user_create(&input))?;

        let id = generate_id("usr");
        let email = normalize_email(&input.email);
        let role = input.role.unwrap_or_default();
        let password_hash =
            hash_password(&input.password).map_err(|e| StorageError::Credential(e.to_string()))?;

        debug!("Creating user: {} ({}) with role {}", id, email, role);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, department, position, avatar, supervisor_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(role)
        .bind(&input.department)
        .bind(&input.position)
        .bind(&input.avatar)
        .bind(&input.supervisor_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, || StorageError::DuplicateEmail(email.clone())))?;

        self.get_user(&id).await
    }

    pub async fn get_user(&self, user_id: &str) -> StorageResult<User> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("User {}", user_id)))?;

        row_to_user(&row)
    }

    /// Look up a user by email, ignoring case and surrounding whitespace
    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn list_users(&self, filter: &UserFilter) -> StorageResult<Vec<User>> {
        let (users, _) = self.list_users_paginated(filter, None, None).await?;
        Ok(users)
    }

    pub async fn list_users_paginated(
        &self,
        filter: &UserFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> StorageResult<(Vec<User>, i64)> {
        debug!(
            "Listing users (filter: {:?}, limit: {:?}, offset: {:?})",
            filter, limit, offset
        );

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users WHERE 1 = 1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE 1 = 1");
        push_filter(&mut query, filter);
        query.push(" ORDER BY name COLLATE NOCASE, created_at");
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

        let users = rows.iter().map(row_to_user).collect::<StorageResult<Vec<_>>>()?;
        Ok((users, total))
    }

    pub async fn update_user(&self, user_id: &str, input: UserUpdateInput) -> StorageResult<User> {
        debug!("Updating user: {}", user_id);
        StorageError::check(validate_user_update(&input))?;

        // Column names are literals; every value goes through push_bind
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "UPDATE users SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        );

        if let Some(name) = &input.name {
            query_builder.push(", name = ").push_bind(name.trim().to_string());
        }
        let email = input.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            query_builder.push(", email = ").push_bind(email.clone());
        }
        if let Some(password) = &input.password {
            let hash =
                hash_password(password).map_err(|e| StorageError::Credential(e.to_string()))?;
            query_builder.push(", password_hash = ").push_bind(hash);
        }
        if let Some(role) = input.role {
            query_builder.push(", role = ").push_bind(role);
        }
        if let Some(department) = &input.department {
            query_builder.push(", department = ").push_bind(department.clone());
        }
        if let Some(position) = &input.position {
            query_builder.push(", position = ").push_bind(position.clone());
        }
        if let Some(avatar) = &input.avatar {
            query_builder.push(", avatar = ").push_bind(avatar.clone());
        }
        if let Some(supervisor_id) = &input.supervisor_id {
            if supervisor_id == user_id {
                return Err(StorageError::InvalidInput(
                    "A user cannot supervise themselves".to_string(),
                ));
            }
            query_builder.push(", supervisor_id = ").push_bind(supervisor_id.clone());
        }

        query_builder.push(" WHERE id = ").push_bind(user_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let result = query_builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StorageError::from_write(e, || {
                    StorageError::DuplicateEmail(email.clone().unwrap_or_default())
                })
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;
        let user = row_to_user(&row)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(user)
    }

    pub async fn delete_user(&self, user_id: &str) -> StorageResult<()> {
        debug!("Deleting user: {}", user_id);

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }
        Ok(())
    }

    /// Return the user when `email` and `password` match, `None` otherwise
    pub async fn authenticate(&self, email: &str, password: &str) -> StorageResult<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            debug!("Login attempt for unknown email");
            return Ok(None);
        };

        let matches = verify_password(password, &user.password_hash)
            .map_err(|e| StorageError::Credential(e.to_string()))?;

        Ok(matches.then_some(user))
    }

    pub async fn count_by_role(&self, role: Role) -> StorageResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &UserFilter) {
    if let Some(role) = filter.role {
        query.push(" AND role = ").push_bind(role);
    }
    if let Some(department) = &filter.department {
        query.push(" AND department = ").push_bind(department.clone());
    }
    if let Some(supervisor_id) = &filter.supervisor_id {
        query.push(" AND supervisor_id = ").push_bind(supervisor_id.clone());
    }
}

fn row_to_user(row: &SqliteRow) -> StorageResult<User> {
    Ok(User {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        name: row.try_get("name").map_err(StorageError::Sqlx)?,
        email: row.try_get("email").map_err(StorageError::Sqlx)?,
        password_hash: row.try_get("password_hash").map_err(StorageError::Sqlx)?,
        role: row.try_get("role").map_err(StorageError::Sqlx)?,
        department: row.try_get("department").map_err(StorageError::Sqlx)?,
        position: row.try_get("position").map_err(StorageError::Sqlx)?,
        avatar: row.try_get("avatar").map_err(StorageError::Sqlx)?,
        supervisor_id: row.try_get("supervisor_id").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
