//! HTTP error mapping.
//!
//! # Invariants
//! - Every error body is `{"error", "message"}` plus `"field"` for
//!   validation failures.
//! - Storage details are logged, never returned to the client.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use memberdesk_core::ServiceError;
use serde::Serialize;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// Body could not be decoded.
    BadRequest(String),
    /// Path segment is not a valid identifier, so no resource can match it.
    UnmatchedPath(String),
    /// Background task failed before producing a result.
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Service(err) => service_status_and_body(err),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                body("bad_request", message.clone()),
            ),
            Self::UnmatchedPath(message) => {
                (StatusCode::NOT_FOUND, body("not_found", message.clone()))
            }
            Self::Internal(details) => {
                error!("event=http_error module=api status=error kind=internal error={details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("internal_error", "internal server error".to_string()),
                )
            }
        }
    }
}

fn service_status_and_body(err: &ServiceError) -> (StatusCode, ErrorBody) {
    match err {
        ServiceError::Validation(validation) => (
            StatusCode::BAD_REQUEST,
            ErrorBody {
                error: "validation_error",
                message: validation.to_string(),
                field: Some(validation.field()),
            },
        ),
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, body("not_found", err.to_string())),
        ServiceError::InvariantViolation(_) => (
            StatusCode::BAD_REQUEST,
            body("invariant_violation", err.to_string()),
        ),
        ServiceError::Conflict(_) => (StatusCode::CONFLICT, body("conflict", err.to_string())),
        ServiceError::WriteFailed(_) => (
            StatusCode::BAD_REQUEST,
            body("write_failed", err.to_string()),
        ),
        ServiceError::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            body("cancelled", err.to_string()),
        ),
        ServiceError::Storage(storage) => {
            error!("event=http_error module=api status=error kind=storage error={storage}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                body("storage_error", "storage failure".to_string()),
            )
        }
    }
}

fn body(error: &'static str, message: String) -> ErrorBody {
    ErrorBody {
        error,
        message,
        field: None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::UnmatchedPath(value.body_text())
    }
}
