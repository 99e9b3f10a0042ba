use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use proctor_shared::{ParseEnumError, ScheduleError};
use proctor_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Conflict(String),

    /// The request is well formed but the caller's data does not allow it.
    #[error("{0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidState(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Record not found".into()),
            StoreError::Conflict(message) => ApiError::Conflict(message),
            other => {
                tracing::error!(error = %other, "store failure");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<ParseEnumError> for ApiError {
    fn from(err: ParseEnumError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "status": "error",
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        assert_eq!(ApiError::from(StoreError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StoreError::Conflict("taken".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Migration("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_state_is_bad_request() {
        assert_eq!(
            ApiError::InvalidState("User is not enrolled in any course".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unknown_enum_is_validation() {
        let err = ApiError::from(ParseEnumError::new("resource type", "PODCAST"));
        assert!(matches!(err, ApiError::Validation(ref m) if m == "Invalid resource type: PODCAST"));
    }
}
