// ABOUTME: Integration tests for department storage
// ABOUTME: Covers unique names, member counts, head references, and updates

use okrdesk_core::{DepartmentCreateInput, DepartmentUpdateInput};
use okrdesk_departments::DepartmentStorage;
use okrdesk_storage::{connect_in_memory, StorageError};
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;

async fn setup() -> (SqlitePool, DepartmentStorage) {
    let pool = connect_in_memory().await.unwrap();
    (pool.clone(), DepartmentStorage::new(pool))
}

async fn add_member(pool: &SqlitePool, id: &str, department: &str) {
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, department) VALUES (?, ?, ?, 'x', ?)",
    )
    .bind(id)
    .bind(id)
    .bind(format!("{}@example.com", id))
    .bind(department)
    .execute(pool)
    .await
    .unwrap();
}

fn named(name: &str) -> DepartmentCreateInput {
    DepartmentCreateInput {
        name: name.to_string(),
        head_id: None,
    }
}

#[tokio::test]
async fn test_create_and_get_department() {
    let (_pool, departments) = setup().await;

    let created = departments.create_department(named("  Engineering ")).await.unwrap();
    let fetched = departments.get_department(&created.id).await.unwrap();

    assert_eq!(fetched.name, "Engineering");
    assert_eq!(fetched.member_count, 0);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_duplicate_name_is_rejected() {
    let (_pool, departments) = setup().await;
    departments.create_department(named("Sales")).await.unwrap();

    let err = departments.create_department(named("sales")).await.unwrap_err();
    assert!(matches!(err, StorageError::DuplicateName(_)));
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let (_pool, departments) = setup().await;

    let err = departments.create_department(named("   ")).await.unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_member_count_follows_users() {
    let (pool, departments) = setup().await;
    let engineering = departments.create_department(named("Engineering")).await.unwrap();
    departments.create_department(named("Sales")).await.unwrap();

    add_member(&pool, "u1", "Engineering").await;
    add_member(&pool, "u2", "engineering").await;
    add_member(&pool, "u3", "Sales").await;

    let fetched = departments.get_department(&engineering.id).await.unwrap();
    assert_eq!(fetched.member_count, 2);

    let all = departments.list_departments().await.unwrap();
    let counts: Vec<(String, i64)> = all.into_iter().map(|d| (d.name, d.member_count)).collect();
    assert_eq!(
        counts,
        vec![("Engineering".to_string(), 2), ("Sales".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_head_must_reference_a_user() {
    let (pool, departments) = setup().await;

    let err = departments
        .create_department(DepartmentCreateInput {
            name: "Ops".to_string(),
            head_id: Some("usr-ghost".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::ConstraintViolation(_)));

    add_member(&pool, "lead", "Ops").await;
    let ops = departments
        .create_department(DepartmentCreateInput {
            name: "Ops".to_string(),
            head_id: Some("lead".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(ops.head_id.as_deref(), Some("lead"));
}

#[tokio::test]
async fn test_update_department() {
    let (_pool, departments) = setup().await;
    let dept = departments.create_department(named("Marketing")).await.unwrap();
    departments.create_department(named("Growth")).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let renamed = departments
        .update_department(
            &dept.id,
            DepartmentUpdateInput {
                name: Some("Brand".to_string()),
                head_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Brand");
    assert!(renamed.updated_at > dept.updated_at);

    let err = departments
        .update_department(
            &dept.id,
            DepartmentUpdateInput {
                name: Some("growth".to_string()),
                head_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateName(_)));
}

#[tokio::test]
async fn test_delete_department() {
    let (_pool, departments) = setup().await;
    let dept = departments.create_department(named("Legal")).await.unwrap();

    departments.delete_department(&dept.id).await.unwrap();

    assert!(matches!(
        departments.get_department(&dept.id).await.unwrap_err(),
        StorageError::NotFound(_)
    ));
    assert!(matches!(
        departments.delete_department(&dept.id).await.unwrap_err(),
        StorageError::NotFound(_)
    ));
    assert_eq!(departments.count_departments().await.unwrap(), 0);
}
