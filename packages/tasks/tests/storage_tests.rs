// ABOUTME: Integration tests for task storage
// ABOUTME: Covers defaults, name snapshots, filters, and link clearing

use chrono::{TimeZone, Utc};
use okrdesk_core::{TaskCreateInput, TaskFilter, TaskPriority, TaskStatus, TaskUpdateInput};
use okrdesk_storage::{connect_in_memory, StorageError};
use okrdesk_tasks::TaskStorage;
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;

async fn setup() -> (SqlitePool, TaskStorage) {
    let pool = connect_in_memory().await.unwrap();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash) VALUES
            ('u-ada', 'Ada', 'ada@example.com', 'x'),
            ('u-bob', 'Bob', 'bob@example.com', 'x')
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO objectives (id, title, owner_id, owner_name, quarter, year) VALUES ('obj-1', 'Grow', 'u-ada', 'Ada', 1, 2024)",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO key_results (id, objective_id, title, target_value) VALUES ('kr-1', 'obj-1', 'Signups', 100)",
    )
    .execute(&pool)
    .await
    .unwrap();

    (pool.clone(), TaskStorage::new(pool))
}

fn task(title: &str) -> TaskCreateInput {
    TaskCreateInput {
        title: title.to_string(),
        description: None,
        status: None,
        priority: None,
        assignee_id: None,
        key_result_id: None,
        due_date: None,
    }
}

#[tokio::test]
async fn test_create_task_defaults() {
    let (_pool, tasks) = setup().await;

    let created = tasks.create_task(task("Write docs")).await.unwrap();

    assert_eq!(created.status, TaskStatus::Todo);
    assert_eq!(created.priority, TaskPriority::Medium);
    assert_eq!(created.assignee_name, None);
}

#[tokio::test]
async fn test_create_task_snapshots_names() {
    let (pool, tasks) = setup().await;

    let mut input = task("Launch campaign");
    input.assignee_id = Some("u-ada".to_string());
    input.key_result_id = Some("kr-1".to_string());
    input.due_date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    let created = tasks.create_task(input).await.unwrap();

    assert_eq!(created.assignee_name.as_deref(), Some("Ada"));
    assert_eq!(created.key_result_title.as_deref(), Some("Signups"));
    assert_eq!(created.due_date, Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));

    // Snapshots do not follow later renames
    sqlx::query("UPDATE users SET name = 'Ada Lovelace' WHERE id = 'u-ada'")
        .execute(&pool)
        .await
        .unwrap();
    let fetched = tasks.get_task(&created.id).await.unwrap();
    assert_eq!(fetched.assignee_name.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_unknown_references_are_rejected() {
    let (_pool, tasks) = setup().await;

    let mut input = task("Orphan");
    input.assignee_id = Some("u-ghost".to_string());
    assert!(matches!(
        tasks.create_task(input).await.unwrap_err(),
        StorageError::NotFound(_)
    ));

    let mut input = task("Orphan");
    input.key_result_id = Some("kr-ghost".to_string());
    assert!(matches!(
        tasks.create_task(input).await.unwrap_err(),
        StorageError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_update_task_reassigns_and_clears() {
    let (_pool, tasks) = setup().await;
    let mut input = task("Review");
    input.assignee_id = Some("u-ada".to_string());
    input.key_result_id = Some("kr-1".to_string());
    let created = tasks.create_task(input).await.unwrap();

    let reassigned = tasks
        .update_task(
            &created.id,
            TaskUpdateInput {
                assignee_id: Some("u-bob".to_string()),
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(reassigned.assignee_name.as_deref(), Some("Bob"));
    assert_eq!(reassigned.status, TaskStatus::InProgress);
    assert_eq!(reassigned.key_result_title.as_deref(), Some("Signups"));

    let cleared = tasks
        .update_task(
            &created.id,
            TaskUpdateInput {
                assignee_id: Some(String::new()),
                key_result_id: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.assignee_id, None);
    assert_eq!(cleared.assignee_name, None);
    assert_eq!(cleared.key_result_id, None);
}

#[tokio::test]
async fn test_deleting_key_result_unlinks_tasks() {
    let (pool, tasks) = setup().await;
    let mut input = task("Linked");
    input.key_result_id = Some("kr-1".to_string());
    let created = tasks.create_task(input).await.unwrap();

    sqlx::query("DELETE FROM key_results WHERE id = 'kr-1'")
        .execute(&pool)
        .await
        .unwrap();

    let fetched = tasks.get_task(&created.id).await.unwrap();
    assert_eq!(fetched.key_result_id, None);
}

#[tokio::test]
async fn test_list_tasks_filters() {
    let (_pool, tasks) = setup().await;

    let mut a = task("A");
    a.assignee_id = Some("u-ada".to_string());
    a.status = Some(TaskStatus::Done);
    tasks.create_task(a).await.unwrap();

    let mut b = task("B");
    b.assignee_id = Some("u-bob".to_string());
    tasks.create_task(b).await.unwrap();
    tasks.create_task(task("C")).await.unwrap();

    let done = tasks
        .list_tasks(&TaskFilter {
            status: Some(TaskStatus::Done),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].title, "A");

    let bobs = tasks
        .list_tasks(&TaskFilter {
            assignee_id: Some("u-bob".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(bobs.len(), 1);

    let (page, total) = tasks
        .list_tasks_paginated(&TaskFilter::default(), Some(2), Some(0))
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn test_delete_task() {
    let (_pool, tasks) = setup().await;
    let created = tasks.create_task(task("Temp")).await.unwrap();

    tasks.delete_task(&created.id).await.unwrap();

    assert!(matches!(
        tasks.delete_task(&created.id).await.unwrap_err(),
        StorageError::NotFound(_)
    ));
}
