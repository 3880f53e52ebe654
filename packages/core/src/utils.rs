// ABOUTME: Shared utility functions for OKRDesk
// ABOUTME: ID generation, progress arithmetic, and period helpers

use chrono::{Datelike, NaiveDate};

/// Generate a record ID of the form `<prefix>-<nanoid>`
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, nanoid::nanoid!(12))
}

/// Progress of a measured value towards its target, as a percentage in 0..=100.
///
/// Targets of zero or below have no meaningful ratio and report 0.
pub fn compute_progress(current: f64, target: f64) -> f64 {
    if !target.is_finite() || !current.is_finite() || target <= 0.0 {
        return 0.0;
    }
    round2((current / target * 100.0).clamp(0.0, 100.0))
}

/// Arithmetic mean of a set of progress values, 0 when empty
pub fn mean_progress<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        round2(sum / count as f64)
    }
}

/// Calendar quarter (1..=4) containing the given date
pub fn quarter_of(date: NaiveDate) -> i32 {
    (date.month0() / 3 + 1) as i32
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
