//! Error kinds observable by callers
//!
//! Error code ranges follow the server's convention:
//! - E40xx: order validation errors
//! - E409x: concurrency errors
//! - E9xxx: system/storage errors

use super::ErrorCategory;
use serde::{Deserialize, Serialize};

/// The closed set of error kinds the engine can return
///
/// Serialized SCREAMING_SNAKE_CASE; this is the `errorKind` field of the
/// operation result envelope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The requested status change is not a valid edge of the lifecycle
    InvalidTransition,
    /// The order is served or cancelled and accepts no further mutation
    OrderTerminal,
    /// The change set would leave the order empty; cancel instead
    CannotRemoveAllItems,
    /// The staff member has not confirmed the customer was notified
    CustomerNotRequired,
    /// Quantity outside [1, 99]
    InvalidQuantity,
    /// A change referenced an item not on the order
    UnknownItem,
    /// Reason notes missing for `other`, or over the length limit
    InvalidReason,
    /// A money value is negative or out of range
    InvalidAmount,
    /// The request shape is valid but the operation makes no sense here
    /// (e.g. an empty change set)
    InvalidOperation,
    /// No order with the given ID
    OrderNotFound,
    /// The caller's expected version no longer matches the stored order
    VersionConflict,
    /// The atomic write failed; nothing was persisted
    PersistenceError,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::InvalidTransition
            | ErrorKind::OrderTerminal
            | ErrorKind::CannotRemoveAllItems
            | ErrorKind::CustomerNotRequired
            | ErrorKind::InvalidQuantity
            | ErrorKind::UnknownItem
            | ErrorKind::InvalidReason
            | ErrorKind::InvalidAmount
            | ErrorKind::InvalidOperation
            | ErrorKind::OrderNotFound => ErrorCategory::Validation,
            ErrorKind::VersionConflict => ErrorCategory::Concurrency,
            ErrorKind::PersistenceError => ErrorCategory::Infrastructure,
        }
    }

    /// Stable response code for the API envelope
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidTransition => "E4001",
            ErrorKind::OrderTerminal => "E4002",
            ErrorKind::CannotRemoveAllItems => "E4003",
            ErrorKind::CustomerNotRequired => "E4004",
            ErrorKind::InvalidQuantity => "E4005",
            ErrorKind::UnknownItem => "E4006",
            ErrorKind::InvalidReason => "E4007",
            ErrorKind::InvalidAmount => "E4008",
            ErrorKind::InvalidOperation => "E4009",
            ErrorKind::OrderNotFound => "E4040",
            ErrorKind::VersionConflict => "E4090",
            ErrorKind::PersistenceError => "E9001",
        }
    }

    /// Default human-readable message
    ///
    /// Validation errors surface the precise reason; concurrency and
    /// infrastructure errors stay generic and ask the caller to retry.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidTransition => "invalid status transition",
            ErrorKind::OrderTerminal => "order is in a terminal state",
            ErrorKind::CannotRemoveAllItems => {
                "cannot remove all items - cancel the order instead"
            }
            ErrorKind::CustomerNotRequired => {
                "customer must be notified before the change is accepted"
            }
            ErrorKind::InvalidQuantity => "quantity must be between 1 and 99",
            ErrorKind::UnknownItem => "item is not on the order",
            ErrorKind::InvalidReason => "reason notes are missing or too long",
            ErrorKind::InvalidAmount => "amount must be a non-negative money value",
            ErrorKind::InvalidOperation => "operation is not valid for this order",
            ErrorKind::OrderNotFound => "order not found",
            ErrorKind::VersionConflict => "order changed concurrently - refresh and retry",
            ErrorKind::PersistenceError => "temporary storage error - please retry",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
