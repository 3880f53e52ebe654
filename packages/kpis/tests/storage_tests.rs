// ABOUTME: Integration tests for KPI storage
// ABOUTME: Covers defaults, derived period, completion, overdue marking, and filters

use chrono::NaiveDate;
use okrdesk_core::{KpiCreateInput, KpiFilter, KpiStatus, KpiType, KpiUpdateInput};
use okrdesk_kpis::KpiStorage;
use okrdesk_storage::{connect_in_memory, StorageError};
use pretty_assertions::assert_eq;

async fn setup() -> KpiStorage {
    let pool = connect_in_memory().await.unwrap();
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role) VALUES
            ('mgr', 'Mina Manager', 'mina@example.com', 'x', 'MANAGER'),
            ('emp', 'Eli Employee', 'eli@example.com', 'x', 'EMPLOYEE')
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    KpiStorage::new(pool)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn kpi(title: &str, current: Option<f64>, target: f64) -> KpiCreateInput {
    KpiCreateInput {
        title: title.to_string(),
        description: None,
        kpi_type: None,
        target_value: target,
        current_value: current,
        unit: Some("%".to_string()),
        department: Some("Sales".to_string()),
        assignee_id: None,
        objective_id: None,
        start_date: date(2024, 4, 1),
        end_date: date(2024, 6, 30),
        quarter: None,
        year: None,
    }
}

#[tokio::test]
async fn test_create_kpi_defaults_and_derived_period() {
    let kpis = setup().await;

    let created = kpis.create_kpi("mgr", kpi("Pipeline", None, 200.0)).await.unwrap();

    assert_eq!(created.kpi_type, KpiType::Department);
    assert_eq!(created.status, KpiStatus::Active);
    assert_eq!(created.current_value, 0.0);
    assert_eq!(created.progress, 0.0);
    assert_eq!((created.quarter, created.year), (2, 2024));
    assert_eq!(created.assigned_by_name.as_deref(), Some("Mina Manager"));
    assert_eq!(created.start_date, date(2024, 4, 1));
}

#[tokio::test]
async fn test_personal_kpi_snapshots_assignee() {
    let kpis = setup().await;

    let mut input = kpi("Calls", Some(10.0), 40.0);
    input.kpi_type = Some(KpiType::Personal);
    input.assignee_id = Some("emp".to_string());
    let created = kpis.create_kpi("mgr", input).await.unwrap();

    assert_eq!(created.kpi_type, KpiType::Personal);
    assert_eq!(created.assignee_name.as_deref(), Some("Eli Employee"));
    assert_eq!(created.progress, 25.0);
}

#[tokio::test]
async fn test_reaching_target_completes() {
    let kpis = setup().await;
    let created = kpis.create_kpi("mgr", kpi("Deals", Some(5.0), 10.0)).await.unwrap();

    let updated = kpis
        .update_kpi(
            &created.id,
            KpiUpdateInput {
                current_value: Some(12.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.progress, 100.0);
    assert_eq!(updated.status, KpiStatus::Completed);

    let lowered = kpis
        .update_kpi(
            &created.id,
            KpiUpdateInput {
                target_value: Some(24.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(lowered.progress, 50.0);
    assert_eq!(lowered.status, KpiStatus::Active);
}

#[tokio::test]
async fn test_created_at_target_is_completed() {
    let kpis = setup().await;

    let created = kpis.create_kpi("mgr", kpi("Done already", Some(10.0), 10.0)).await.unwrap();
    assert_eq!(created.status, KpiStatus::Completed);
}

#[tokio::test]
async fn test_refresh_overdue_marks_only_active_past_kpis() {
    let kpis = setup().await;
    let past = kpis.create_kpi("mgr", kpi("Past", None, 10.0)).await.unwrap();
    let completed = kpis.create_kpi("mgr", kpi("Completed", Some(10.0), 10.0)).await.unwrap();
    let mut future = kpi("Future", None, 10.0);
    future.end_date = date(2024, 12, 31);
    let future = kpis.create_kpi("mgr", future).await.unwrap();

    let marked = kpis.refresh_overdue(date(2024, 7, 1)).await.unwrap();
    assert_eq!(marked, 1);

    assert_eq!(kpis.get_kpi(&past.id).await.unwrap().status, KpiStatus::Overdue);
    assert_eq!(kpis.get_kpi(&completed.id).await.unwrap().status, KpiStatus::Completed);
    assert_eq!(kpis.get_kpi(&future.id).await.unwrap().status, KpiStatus::Active);

    // The end date itself is not overdue
    assert_eq!(kpis.refresh_overdue(date(2024, 12, 31)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_extending_end_date_reopens_overdue_kpi() {
    let kpis = setup().await;
    let created = kpis.create_kpi("mgr", kpi("Late", None, 10.0)).await.unwrap();
    kpis.refresh_overdue(date(2024, 7, 1)).await.unwrap();

    let still_late = kpis
        .update_kpi_as_of(
            &created.id,
            KpiUpdateInput {
                description: Some("Chasing".to_string()),
                ..Default::default()
            },
            date(2024, 7, 1),
        )
        .await
        .unwrap();
    assert_eq!(still_late.status, KpiStatus::Overdue);

    let extended = kpis
        .update_kpi_as_of(
            &created.id,
            KpiUpdateInput {
                end_date: Some(date(2030, 12, 31)),
                ..Default::default()
            },
            date(2024, 7, 1),
        )
        .await
        .unwrap();
    assert_eq!(extended.status, KpiStatus::Active);

    // Extended KPIs are not re-marked until the new end date passes
    assert_eq!(kpis.refresh_overdue(date(2024, 7, 2)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_explicit_overdue_status_is_kept() {
    let kpis = setup().await;
    let created = kpis.create_kpi("mgr", kpi("Flagged", None, 10.0)).await.unwrap();

    let flagged = kpis
        .update_kpi(
            &created.id,
            KpiUpdateInput {
                status: Some(KpiStatus::Overdue),
                end_date: Some(date(2030, 12, 31)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(flagged.status, KpiStatus::Overdue);
}

#[tokio::test]
async fn test_update_rejects_inverted_dates() {
    let kpis = setup().await;
    let created = kpis.create_kpi("mgr", kpi("Dates", None, 10.0)).await.unwrap();

    let err = kpis
        .update_kpi(
            &created.id,
            KpiUpdateInput {
                end_date: Some(date(2024, 3, 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Validation(ref errors) if errors[0].field == "endDate"));
}

#[tokio::test]
async fn test_moving_start_date_moves_period() {
    let kpis = setup().await;
    let created = kpis.create_kpi("mgr", kpi("Move", None, 10.0)).await.unwrap();

    let moved = kpis
        .update_kpi(
            &created.id,
            KpiUpdateInput {
                start_date: Some(date(2024, 5, 15)),
                end_date: Some(date(2024, 11, 30)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.quarter, 2);

    let moved = kpis
        .update_kpi(
            &created.id,
            KpiUpdateInput {
                start_date: Some(date(2024, 10, 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!((moved.quarter, moved.year), (4, 2024));
}

#[tokio::test]
async fn test_list_kpis_filters() {
    let kpis = setup().await;
    let mut personal = kpi("Personal", None, 10.0);
    personal.kpi_type = Some(KpiType::Personal);
    personal.assignee_id = Some("emp".to_string());
    kpis.create_kpi("mgr", personal).await.unwrap();
    kpis.create_kpi("mgr", kpi("Team", None, 10.0)).await.unwrap();

    let found = kpis
        .list_kpis(&KpiFilter {
            kpi_type: Some(KpiType::Personal),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Personal");

    let (all, total) = kpis
        .list_kpis_paginated(
            &KpiFilter {
                department: Some("Sales".to_string()),
                quarter: Some(2),
                ..Default::default()
            },
            Some(10),
            Some(0),
        )
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_delete_kpi() {
    let kpis = setup().await;
    let created = kpis.create_kpi("mgr", kpi("Gone", None, 10.0)).await.unwrap();

    kpis.delete_kpi(&created.id).await.unwrap();
    assert!(matches!(
        kpis.get_kpi(&created.id).await.unwrap_err(),
        StorageError::NotFound(_)
    ));
}
