// ABOUTME: Database connectivity check behind `okrdesk check-db`
// ABOUTME: Opens the configured database and reads the department collection

use std::path::Path;

use okrdesk_departments::DepartmentStorage;
use okrdesk_storage::{connect_existing, StorageResult};
use tracing::info;

/// What the connectivity check found
#[derive(Debug, Clone, PartialEq)]
pub struct DbReport {
    pub department_count: i64,
    pub department_names: Vec<String>,
}

/// Read the department collection of an existing database; a missing file is an error
pub async fn check_database(path: &Path) -> StorageResult<DbReport> {
    info!("Checking database at {}", path.display());

    let pool = connect_existing(path).await?;
    let departments = DepartmentStorage::new(pool.clone());

    let department_count = departments.count_departments().await?;
    let department_names = departments
        .list_departments()
        .await?
        .into_iter()
        .map(|d| d.name)
        .collect();

    pool.close().await;

    Ok(DbReport {
        department_count,
        department_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use okrdesk_core::DepartmentCreateInput;
    use okrdesk_storage::connect;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_check_reports_departments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("okrdesk.db");

        let pool = connect(&path).await.unwrap();
        DepartmentStorage::new(pool.clone())
            .create_department(DepartmentCreateInput {
                name: "Sales".to_string(),
                head_id: None,
            })
            .await
            .unwrap();
        pool.close().await;

        let report = check_database(&path).await.unwrap();
        assert_eq!(report.department_count, 1);
        assert_eq!(report.department_names, vec!["Sales".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        assert!(check_database(&blocker.join("okrdesk.db")).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_database_is_an_error_and_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo").join("nope.db");

        assert!(check_database(&path).await.is_err());
        assert!(!path.exists());
    }
}
