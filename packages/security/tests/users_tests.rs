// ABOUTME: Integration tests for user storage and admin bootstrap
// ABOUTME: Runs against an in-memory SQLite database with the full schema

use okrdesk_config::AdminBootstrap;
use okrdesk_core::{PublicUser, Role, UserCreateInput, UserFilter, UserUpdateInput};
use okrdesk_security::{ensure_admin, BootstrapOutcome, UserStorage};
use okrdesk_storage::{connect_in_memory, StorageError};
use pretty_assertions::assert_eq;

async fn setup() -> UserStorage {
    let pool = connect_in_memory().await.unwrap();
    UserStorage::new(pool)
}

fn new_user(name: &str, email: &str) -> UserCreateInput {
    UserCreateInput {
        name: name.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        role: None,
        department: None,
        position: None,
        avatar: None,
        supervisor_id: None,
    }
}

#[tokio::test]
async fn test_create_user_defaults_to_employee() {
    let users = setup().await;

    let user = users.create_user(new_user("Ada", "ada@example.com")).await.unwrap();

    assert_eq!(user.role, Role::Employee);
    assert_eq!(user.created_at, user.updated_at);
    assert_ne!(user.password_hash, "password123");
}

#[tokio::test]
async fn test_email_is_normalized_and_unique() {
    let users = setup().await;

    let user = users
        .create_user(new_user("Ada", "  Ada@Example.COM "))
        .await
        .unwrap();
    assert_eq!(user.email, "ada@example.com");

    let err = users
        .create_user(new_user("Imposter", "ADA@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateEmail(email) if email == "ada@example.com"));
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_storage() {
    let users = setup().await;

    let mut input = new_user("", "nope");
    input.password = "short".to_string();

    match users.create_user(input).await.unwrap_err() {
        StorageError::Validation(errors) => assert_eq!(errors.len(), 3),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_user_changes_fields_and_timestamp() {
    let users = setup().await;
    let user = users.create_user(new_user("Ada", "ada@example.com")).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let updated = users
        .update_user(
            &user.id,
            UserUpdateInput {
                role: Some(Role::Manager),
                department: Some("Engineering".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Manager);
    assert_eq!(updated.department.as_deref(), Some("Engineering"));
    assert_eq!(updated.created_at, user.created_at);
    assert!(updated.updated_at > user.updated_at);
}

#[tokio::test]
async fn test_update_to_taken_email_fails() {
    let users = setup().await;
    users.create_user(new_user("Ada", "ada@example.com")).await.unwrap();
    let grace = users.create_user(new_user("Grace", "grace@example.com")).await.unwrap();

    let err = users
        .update_user(
            &grace.id,
            UserUpdateInput {
                email: Some("ADA@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::DuplicateEmail(_)));
}

#[tokio::test]
async fn test_update_and_delete_missing_user() {
    let users = setup().await;

    let err = users
        .update_user("usr-missing", UserUpdateInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));

    let err = users.delete_user("usr-missing").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn test_list_users_filters_and_paginates() {
    let users = setup().await;

    for (name, email, role) in [
        ("Ada", "ada@example.com", Role::Manager),
        ("Babbage", "babbage@example.com", Role::Employee),
        ("Curie", "curie@example.com", Role::Employee),
    ] {
        let mut input = new_user(name, email);
        input.role = Some(role);
        users.create_user(input).await.unwrap();
    }

    let employees = users
        .list_users(&UserFilter {
            role: Some(Role::Employee),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = employees.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Babbage", "Curie"]);

    let (page, total) = users
        .list_users_paginated(&UserFilter::default(), Some(2), Some(2))
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "Curie");
}

#[tokio::test]
async fn test_authenticate() {
    let users = setup().await;
    users.create_user(new_user("Ada", "ada@example.com")).await.unwrap();

    let ok = users.authenticate("ADA@example.com", "password123").await.unwrap();
    assert_eq!(ok.map(|u| u.name), Some("Ada".to_string()));

    assert!(users.authenticate("ada@example.com", "wrong-password").await.unwrap().is_none());
    assert!(users.authenticate("nobody@example.com", "password123").await.unwrap().is_none());
}

#[tokio::test]
async fn test_public_user_hides_password_hash() {
    let users = setup().await;
    let user = users.create_user(new_user("Ada", "ada@example.com")).await.unwrap();

    let json = serde_json::to_value(PublicUser::from(user)).unwrap();

    assert!(json.get("passwordHash").is_none());
    assert!(json.get("password").is_none());
    assert_eq!(json["role"], "EMPLOYEE");
    assert_eq!(json["email"], "ada@example.com");
}

#[tokio::test]
async fn test_ensure_admin_is_idempotent() {
    let users = setup().await;
    let admin = AdminBootstrap {
        email: "root@example.com".to_string(),
        password: "bootstrap-secret".to_string(),
        name: "Root".to_string(),
    };

    let first = ensure_admin(&users, &admin).await.unwrap();
    assert!(matches!(first, BootstrapOutcome::Created(_)));
    assert_eq!(first.user().role, Role::Admin);

    let second = ensure_admin(&users, &admin).await.unwrap();
    assert!(matches!(second, BootstrapOutcome::AlreadyPresent(_)));
    assert_eq!(second.user().id, first.user().id);

    assert_eq!(users.count_by_role(Role::Admin).await.unwrap(), 1);
    assert!(users
        .authenticate("root@example.com", "bootstrap-secret")
        .await
        .unwrap()
        .is_some());
}
