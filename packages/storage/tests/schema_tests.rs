// ABOUTME: Integration tests for the embedded schema
// ABOUTME: Verifies store-enforced defaults and constraints on raw rows

use okrdesk_storage::{connect, connect_existing, connect_in_memory, StorageError};
use sqlx::{Row, SqlitePool};
use tempfile::TempDir;

async fn insert_user(pool: &SqlitePool, id: &str, email: &str, role: Option<&str>) -> sqlx::Result<()> {
    match role {
        Some(role) => {
            sqlx::query(
                "INSERT INTO users (id, name, email, password_hash, role) VALUES (?, 'Test', ?, 'x', ?)",
            )
            .bind(id)
            .bind(email)
            .bind(role)
            .execute(pool)
            .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO users (id, name, email, password_hash) VALUES (?, 'Test', ?, 'x')",
            )
            .bind(id)
            .bind(email)
            .execute(pool)
            .await?;
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_omitted_role_defaults_to_employee() {
    let pool = connect_in_memory().await.unwrap();

    insert_user(&pool, "u1", "a@example.com", None).await.unwrap();

    let role: String = sqlx::query_scalar("SELECT role FROM users WHERE id = 'u1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(role, "EMPLOYEE");
}

#[tokio::test]
async fn test_role_outside_enumeration_is_rejected() {
    let pool = connect_in_memory().await.unwrap();

    let err = insert_user(&pool, "u1", "a@example.com", Some("SUPERUSER"))
        .await
        .unwrap_err();

    let mapped = StorageError::from_write(err, || StorageError::DuplicateEmail("-".into()));
    assert!(matches!(mapped, StorageError::ConstraintViolation(_)));
}

#[tokio::test]
async fn test_email_unique_ignoring_case() {
    let pool = connect_in_memory().await.unwrap();

    insert_user(&pool, "u1", "dup@example.com", None).await.unwrap();
    let err = insert_user(&pool, "u2", "DUP@example.com", None)
        .await
        .unwrap_err();

    let mapped = StorageError::from_write(err, || {
        StorageError::DuplicateEmail("DUP@example.com".into())
    });
    assert!(matches!(mapped, StorageError::DuplicateEmail(_)));
}

#[tokio::test]
async fn test_timestamps_are_maintained() {
    let pool = connect_in_memory().await.unwrap();
    insert_user(&pool, "u1", "t@example.com", None).await.unwrap();

    let before = sqlx::query("SELECT created_at, updated_at FROM users WHERE id = 'u1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    let created: String = before.get("created_at");
    let updated: String = before.get("updated_at");
    assert!(!created.is_empty());

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    sqlx::query("UPDATE users SET name = 'Renamed' WHERE id = 'u1'")
        .execute(&pool)
        .await
        .unwrap();

    let after = sqlx::query("SELECT created_at, updated_at FROM users WHERE id = 'u1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(after.get::<String, _>("created_at"), created);
    assert!(after.get::<String, _>("updated_at") > updated);

    let parsed: chrono::DateTime<chrono::Utc> = after.get("updated_at");
    assert!(parsed <= chrono::Utc::now());
}

#[tokio::test]
async fn test_key_results_cascade_with_objective() {
    let pool = connect_in_memory().await.unwrap();

    sqlx::query(
        "INSERT INTO objectives (id, title, owner_id, owner_name, quarter, year)
         VALUES ('o1', 'Ship', 'u1', 'Owner', 1, 2025)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO key_results (id, objective_id, title, target_value) VALUES ('k1', 'o1', 'KR', 10)",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM objectives WHERE id = 'o1'")
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM key_results")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_connect_creates_database_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("okrdesk.db");

    let pool = connect(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(db_path.exists());
    pool.close().await;
}

#[tokio::test]
async fn test_connect_existing_refuses_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("typo").join("okrdesk.db");

    assert!(connect_existing(&db_path).await.is_err());
    assert!(!db_path.exists());
    assert!(!db_path.parent().unwrap().exists());
}

#[tokio::test]
async fn test_connect_existing_opens_migrated_database() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("okrdesk.db");
    connect(&db_path).await.unwrap().close().await;

    let pool = connect_existing(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(count, 0);
    pool.close().await;
}
