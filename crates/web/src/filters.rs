//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Uppercased first character, for the avatar badge.
///
/// Usage in templates: `{{ user.email|initial }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn initial(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value
        .to_string()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default())
}
