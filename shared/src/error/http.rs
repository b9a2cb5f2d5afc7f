//! HTTP status mapping for error kinds

use super::ErrorKind;
use http::StatusCode;

impl ErrorKind {
    /// HTTP status for the API surface
    ///
    /// Validation errors are 422 (well-formed but unacceptable), except
    /// `ORDER_NOT_FOUND` which is a plain 404. `VERSION_CONFLICT` is 409 so
    /// dashboards can distinguish "refresh and retry" from a user error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorKind::OrderNotFound => StatusCode::NOT_FOUND,
            ErrorKind::VersionConflict => StatusCode::CONFLICT,
            ErrorKind::PersistenceError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::InvalidTransition
            | ErrorKind::OrderTerminal
            | ErrorKind::CannotRemoveAllItems
            | ErrorKind::CustomerNotRequired
            | ErrorKind::InvalidQuantity
            | ErrorKind::UnknownItem
            | ErrorKind::InvalidReason
            | ErrorKind::InvalidAmount
            | ErrorKind::InvalidOperation => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}
