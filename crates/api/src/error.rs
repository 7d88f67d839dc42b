//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use projections::SaleIssue;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The sale draft cannot be recorded.
    InvalidSale(Vec<SaleIssue>),
    /// Store operation error.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidSale(issues) => {
                let message = issues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                let body = serde_json::json!({ "error": message, "issues": issues });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
            }
            ApiError::Store(err) => store_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::ProductNotFound(_)
        | StoreError::CustomerNotFound(_)
        | StoreError::SaleNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::InvalidSale(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        StoreError::Closed => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        StoreError::Storage(_) => {
            tracing::error!(error = %err, "storage error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidSale(issues) => ApiError::InvalidSale(issues),
            other => ApiError::Store(other),
        }
    }
}
