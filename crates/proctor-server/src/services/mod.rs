//! Request-independent business logic.
//!
//! Every service is a plain synchronous function generic over the
//! repository traits it touches, so the HTTP layer calls them with the
//! shared `Database` and tests call them with in-memory or failing stores.

pub mod catalog;
pub mod enrollment;
pub mod preferences;
pub mod recommendations;
pub mod schedule;
pub mod scheduling;
pub mod users;

use crate::error::ApiError;

pub type ServiceResult<T> = Result<T, ApiError>;

/// Trimmed, non-blank text, or `Validation(message)`.
pub(crate) fn required_text(value: Option<&str>, message: &str) -> ServiceResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ApiError::validation(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text(Some("  Fall 2025 "), "x").unwrap(), "Fall 2025");
        assert!(matches!(required_text(Some("   "), "Semester is required"), Err(ApiError::Validation(m)) if m == "Semester is required"));
        assert!(required_text(None, "x").is_err());
    }
}
