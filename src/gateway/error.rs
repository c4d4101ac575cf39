//! API error responses.
//!
//! Wraps the domain taxonomy into the JSON error body
//! `{code, error, message}` with the status code the error maps to.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::LedgerError;

/// JSON body for every error response.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Stable numeric error code
    pub code: i32,
    /// Error name, e.g. "INSUFFICIENT_FUNDS"
    pub error: &'static str,
    /// Human-readable message
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Domain(LedgerError),
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        Self::Domain(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Domain(e) => {
                // Storage details stay in the log, not in the response.
                let message = match &e {
                    LedgerError::Storage(inner) => {
                        tracing::error!(error = %inner, "storage error");
                        "internal error".to_string()
                    }
                    _ => e.to_string(),
                };
                (
                    e.http_status(),
                    ApiErrorBody {
                        code: e.code(),
                        error: e.name(),
                        message,
                    },
                )
            }
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: 1000,
                    error: "INVALID_PARAMETER",
                    message,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_maps_status() {
        let response = ApiError::from(LedgerError::InsufficientFunds).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError::from(LedgerError::AccountNotFound(1)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::from(LedgerError::SelfTransfer).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bad_request_helper() {
        let response = ApiError::bad_request("unknown status").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
