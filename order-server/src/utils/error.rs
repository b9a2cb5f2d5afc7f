//! Handler error type
//!
//! [`AppError`] is what axum handlers return on failure. It wraps the
//! engine's error classification and renders the unified response envelope:
//! the HTTP status comes from the [`ErrorKind`], the body carries an
//! [`OperationResult`] so dashboards always have `status`/`errorKind` to
//! branch on, and infrastructure errors are logged server-side but never
//! leak internals to the wire.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use shared::response::{ApiResponse, OperationResult};
use shared::{ErrorCategory, ErrorKind};

use crate::engine::error::EngineError;

/// Application error surfaced by a handler
#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Validation failure with a caller-visible message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperation, message)
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        if err.category() == ErrorCategory::Infrastructure {
            tracing::error!(error = %err, "engine infrastructure error");
        }
        Self {
            kind: err.kind(),
            message: err.public_message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ApiResponse::error_with_data(
            self.kind.code(),
            self.message,
            OperationResult::failed(self.kind),
        );
        (self.kind.http_status(), Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_carry_their_kind() {
        let app: AppError = EngineError::CannotRemoveAllItems.into();
        assert_eq!(app.kind, ErrorKind::CannotRemoveAllItems);
        assert!(app.message.contains("cancel the order instead"));
    }

    #[test]
    fn conflict_maps_to_conflict_kind() {
        let app: AppError = EngineError::VersionConflict {
            expected: 3,
            actual: 5,
        }
        .into();
        assert_eq!(app.kind, ErrorKind::VersionConflict);
        // generic message, no internal versions leaked
        assert_eq!(app.message, ErrorKind::VersionConflict.message());
    }
}
