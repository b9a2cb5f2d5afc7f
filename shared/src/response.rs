//! API response types
//!
//! All endpoints answer with [`ApiResponse`]; mutation endpoints put an
//! [`OperationResult`] in its `data` slot, success or failure alike, so
//! dashboards always have the `status`/`errorKind` pair to branch on.

use crate::error::ErrorKind;
use crate::order::Order;
use crate::order::modification::ModificationRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Standard API response code for success
pub const API_CODE_SUCCESS: &str = "E0000";

/// Unified API response envelope
///
/// ```json
/// {
///     "code": "E0000",
///     "message": "Success",
///     "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response code (E0000 = success, others = error codes)
    pub code: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            code: API_CODE_SUCCESS.to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Create an error response that still carries a body
    pub fn error_with_data(
        code: impl Into<String>,
        message: impl Into<String>,
        data: T,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// How a mutation request ended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Committed (or replayed from the idempotency ledger)
    Applied,
    /// Version mismatch; re-fetch and reapply
    Conflict,
    /// Validation failure; do not retry verbatim
    Rejected,
}

/// Outcome of one mutation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification: Option<ModificationRecord>,
    /// Advisory refund for cancellations of paid orders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_owed: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl OperationResult {
    pub fn applied(
        order: Order,
        modification: Option<ModificationRecord>,
        refund_owed: Option<Decimal>,
    ) -> Self {
        Self {
            status: OperationStatus::Applied,
            order: Some(order),
            modification,
            refund_owed,
            error_kind: None,
        }
    }

    /// Failure outcome; `Conflict` for version conflicts, `Rejected` for
    /// everything else
    pub fn failed(kind: ErrorKind) -> Self {
        let status = match kind {
            ErrorKind::VersionConflict => OperationStatus::Conflict,
            _ => OperationStatus::Rejected,
        };
        Self {
            status,
            order: None,
            modification: None,
            refund_owed: None,
            error_kind: Some(kind),
        }
    }
}
