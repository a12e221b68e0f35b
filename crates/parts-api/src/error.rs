//! # Error Responses
//!
//! JSON error body shared by handlers and auth extractors.

use axum::{http::StatusCode, Json};
use parts_core::PartsError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Rejection type of every handler and extractor
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error onto a status code and body.
///
/// Upstream failures are logged in full and answered with a generic message.
pub fn error_to_response(err: PartsError) -> ApiError {
    let code = err.status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let response = if err.is_upstream() {
        error!("Upstream failure: {}", err);
        ErrorResponse::new(
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error"),
            code,
        )
    } else {
        ErrorResponse::new(err.to_string(), code)
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"error": "Test error", "code": 400})
        );
    }

    #[test]
    fn test_auth_errors_keep_their_message() {
        let (status, Json(body)) =
            error_to_response(PartsError::Unauthenticated("Missing Authorization header".into()));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.error.contains("Missing Authorization header"));
    }

    #[test]
    fn test_upstream_errors_are_generic() {
        let (status, Json(body)) =
            error_to_response(PartsError::Storage("password authentication failed".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal Server Error");

        let (status, _) = error_to_response(PartsError::ProviderError {
            provider: "stripe".into(),
            message: "bad key".into(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
