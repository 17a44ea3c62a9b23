//! API error types with IntoResponse
//!
//! Errors are converted to the JSON error envelope with an appropriate
//! status code: `{"success": false, "error": "<code>", "message": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Thread no longer accepts replies (409)
    ThreadClosed { id: i64 },

    /// Reply number already taken (409)
    SequenceConflict { thread_id: i64 },

    /// Database error (500, logged)
    Database(DbError),
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ThreadClosed { .. } | Self::SequenceConflict { .. } => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::ThreadClosed { .. } => "thread_closed",
            Self::SequenceConflict { .. } => "sequence_conflict",
            Self::Database(_) => "internal_error",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::NotFound { resource, id } => format!("{} '{}' not found", resource, id),
            Self::ThreadClosed { id } => {
                format!("thread {} has reached its reply limit and is closed", id)
            }
            Self::SequenceConflict { thread_id } => {
                format!("reply to thread {} collided with another post, retry", thread_id)
            }
            Self::Database(_) => "an internal error occurred".to_owned(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Database(e) = &self {
            // Log the actual error, return generic message
            tracing::error!(error = %e, "database error");
        }

        let body = json!({
            "success": false,
            "error": self.code(),
            "message": self.message(),
        });

        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::ThreadClosed { id } => Self::ThreadClosed { id },
            DbError::SequenceConflict { thread_id } => Self::SequenceConflict { thread_id },
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}
