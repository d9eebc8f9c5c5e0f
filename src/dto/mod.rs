pub mod ad;
pub mod category;
pub mod game;

pub use ad::AdResponse;
pub use category::{CategoryResponse, CategorySummary};
pub use game::GameResponse;

use serde::Serialize;

use crate::error::AppError;

/// `{ "message": "..." }` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============ Field validation ============

/// Trimmed `value`, rejected unless its length is within `min..=max` characters.
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` naming `field` when the length is out of range.
pub fn bounded_text(field: &str, value: &str, min: usize, max: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(if min > 0 {
            AppError::validation(format!(
                "{field} must be between {min} and {max} characters"
            ))
        } else {
            AppError::validation(format!("{field} must not exceed {max} characters"))
        });
    }
    Ok(trimmed.to_string())
}

/// Rejects anything but an absolute `http(s)` URL with a host.
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` naming `field` when `value` is not a URL.
pub fn http_url(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    let host = rest.and_then(|r| r.split(['/', '?', '#']).next()).unwrap_or_default();
    if host.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(AppError::validation(format!("{field} must be a valid URL")));
    }
    Ok(trimmed.to_string())
}

/// Rejects a rating outside `0..=5`.
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` naming `field` when out of range.
pub fn rating_bound(field: &str, value: f64) -> Result<f64, AppError> {
    if (0.0..=5.0).contains(&value) {
        Ok(value)
    } else {
        Err(AppError::validation(format!(
            "{field} must be between 0 and 5"
        )))
    }
}
