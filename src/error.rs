use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::EngineError;
use crate::ingest::{IngestError, ValidationReport};
use crate::report::ReportError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Validation failed: {}", .0.errors.join("; "))]
    Validation(ValidationReport),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A rejected batch is surfaced to the user as a validation failure.
impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Validation(ValidationReport::from_error(err.to_string()))
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(report) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "validations": report }),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "ok": false, "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "ok": false, "error": msg })),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "error": msg }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
