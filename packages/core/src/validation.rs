// ABOUTME: Input validation for record create and update payloads
// ABOUTME: Collects field-level errors before anything reaches storage

use thiserror::Error;

use crate::types::{
    KeyResultCreateInput, KeyResultUpdateInput, KpiCreateInput, KpiUpdateInput,
    ObjectiveCreateInput, ObjectiveUpdateInput, TaskCreateInput, TaskUpdateInput,
    UserCreateInput, UserUpdateInput,
};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Accepted range for objective and KPI years
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Validation error for a single input field
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Canonical form used for storage and uniqueness checks
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn require_text(errors: &mut Vec<ValidationError>, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, format!("{} is required", label)));
    }
}

fn check_optional_text(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: &Option<String>,
    label: &str,
) {
    if let Some(v) = value {
        if v.trim().is_empty() {
            errors.push(ValidationError::new(
                field,
                format!("{} cannot be empty", label),
            ));
        }
    }
}

fn check_period(errors: &mut Vec<ValidationError>, quarter: Option<i32>, year: Option<i32>) {
    if let Some(q) = quarter {
        if !(1..=4).contains(&q) {
            errors.push(ValidationError::new("quarter", "Quarter must be between 1 and 4"));
        }
    }
    if let Some(y) = year {
        if !YEAR_RANGE.contains(&y) {
            errors.push(ValidationError::new(
                "year",
                format!(
                    "Year must be between {} and {}",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                ),
            ));
        }
    }
}

fn check_target(errors: &mut Vec<ValidationError>, field: &str, target: f64) {
    if !target.is_finite() || target <= 0.0 {
        errors.push(ValidationError::new(
            field,
            "Target value must be a positive number",
        ));
    }
}

fn check_current(errors: &mut Vec<ValidationError>, field: &str, current: Option<f64>) {
    if let Some(c) = current {
        if !c.is_finite() {
            errors.push(ValidationError::new(field, "Current value must be a number"));
        }
    }
}

fn check_password(errors: &mut Vec<ValidationError>, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(ValidationError::new(
            "password",
            format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ),
        ));
    }
}

pub fn validate_user_create(input: &UserCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require_text(&mut errors, "name", &input.name, "Name");
    if !is_plausible_email(&input.email) {
        errors.push(ValidationError::new("email", "A valid email address is required"));
    }
    check_password(&mut errors, &input.password);

    errors
}

pub fn validate_user_update(input: &UserUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_optional_text(&mut errors, "name", &input.name, "Name");
    if let Some(email) = &input.email {
        if !is_plausible_email(email) {
            errors.push(ValidationError::new("email", "A valid email address is required"));
        }
    }
    if let Some(password) = &input.password {
        check_password(&mut errors, password);
    }

    errors
}

pub fn validate_department_name(name: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_text(&mut errors, "name", name, "Department name");
    errors
}

pub fn validate_key_result_create(input: &KeyResultCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require_text(&mut errors, "title", &input.title, "Key result title");
    check_target(&mut errors, "targetValue", input.target_value);
    check_current(&mut errors, "currentValue", input.current_value);

    errors
}

pub fn validate_key_result_update(input: &KeyResultUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_optional_text(&mut errors, "title", &input.title, "Key result title");
    if let Some(target) = input.target_value {
        check_target(&mut errors, "targetValue", target);
    }
    check_current(&mut errors, "currentValue", input.current_value);

    errors
}

pub fn validate_objective_create(input: &ObjectiveCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require_text(&mut errors, "title", &input.title, "Objective title");
    check_period(&mut errors, Some(input.quarter), Some(input.year));

    for (index, kr) in input.key_results.iter().enumerate() {
        for e in validate_key_result_create(kr) {
            errors.push(ValidationError::new(
                format!("keyResults[{}].{}", index, e.field),
                e.message,
            ));
        }
    }

    errors
}

pub fn validate_objective_update(input: &ObjectiveUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_optional_text(&mut errors, "title", &input.title, "Objective title");
    check_period(&mut errors, input.quarter, input.year);

    errors
}

pub fn validate_task_create(input: &TaskCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_text(&mut errors, "title", &input.title, "Task title");
    errors
}

pub fn validate_task_update(input: &TaskUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_optional_text(&mut errors, "title", &input.title, "Task title");
    errors
}

pub fn validate_kpi_create(input: &KpiCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    require_text(&mut errors, "title", &input.title, "KPI title");
    check_target(&mut errors, "targetValue", input.target_value);
    check_current(&mut errors, "currentValue", input.current_value);
    check_period(&mut errors, input.quarter, input.year);

    if input.end_date < input.start_date {
        errors.push(ValidationError::new(
            "endDate",
            "End date cannot be before start date",
        ));
    }

    errors
}

pub fn validate_kpi_update(input: &KpiUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_optional_text(&mut errors, "title", &input.title, "KPI title");
    if let Some(target) = input.target_value {
        check_target(&mut errors, "targetValue", target);
    }
    check_current(&mut errors, "currentValue", input.current_value);

    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            errors.push(ValidationError::new(
                "endDate",
                "End date cannot be before start date",
            ));
        }
    }

    errors
}

/// Truncates a string to a maximum length with ellipsis
pub fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn user_input(email: &str, password: &str) -> UserCreateInput {
        UserCreateInput {
            name: "Grace".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
            department: None,
            position: None,
            avatar: None,
            supervisor_id: None,
        }
    }

    fn kpi_input(start: (i32, u32, u32), end: (i32, u32, u32)) -> KpiCreateInput {
        KpiCreateInput {
            title: "Revenue".to_string(),
            description: None,
            kpi_type: None,
            target_value: 100.0,
            current_value: None,
            unit: Some("k$".to_string()),
            department: Some("Sales".to_string()),
            assignee_id: None,
            objective_id: None,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            quarter: None,
            year: None,
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_validate_user_create_valid() {
        assert!(validate_user_create(&user_input("grace@example.com", "hopper123")).is_empty());
    }

    #[test]
    fn test_validate_user_create_bad_email_and_password() {
        let errors = validate_user_create(&user_input("not-an-email", "short"));
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a b@c.co"));
        assert!(!is_plausible_email("a@@b.co"));
        assert!(!is_plausible_email("a@b.co."));
    }

    #[test]
    fn test_validate_objective_create_nested_key_results() {
        let input = ObjectiveCreateInput {
            title: "Grow".to_string(),
            description: None,
            department: None,
            quarter: 5,
            year: 2024,
            key_results: vec![KeyResultCreateInput {
                title: "".to_string(),
                current_value: None,
                target_value: 0.0,
                unit: None,
            }],
        };

        let errors = validate_objective_create(&input);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["quarter", "keyResults[0].title", "keyResults[0].targetValue"]
        );
    }

    #[test]
    fn test_validate_kpi_dates() {
        assert!(validate_kpi_create(&kpi_input((2024, 1, 1), (2024, 3, 31))).is_empty());

        let errors = validate_kpi_create(&kpi_input((2024, 4, 1), (2024, 3, 31)));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "endDate");
    }

    #[test]
    fn test_validate_update_rejects_blank_title() {
        let update = TaskUpdateInput {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(validate_task_update(&update).len(), 1);
        assert!(validate_task_update(&TaskUpdateInput::default()).is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("", 5), "");
    }
}
