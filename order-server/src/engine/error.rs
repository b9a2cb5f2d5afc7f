//! Engine errors
//!
//! One enum for the whole engine. Every variant classifies to a
//! [`shared::ErrorKind`], which drives the HTTP status and the
//! `status`/`errorKind` pair of the operation result. Store failures are
//! collapsed to `PERSISTENCE_ERROR` so internal details never leak to
//! callers.

use super::store::StoreError;
use shared::order::OrderStatus;
use shared::{ErrorCategory, ErrorKind};
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order is terminal ({0}) and accepts no further changes")]
    OrderTerminal(OrderStatus),

    #[error("cannot remove all items - cancel the order instead")]
    CannotRemoveAllItems,

    #[error("customer must be notified before the change is accepted")]
    CustomerNotRequired,

    #[error("quantity must be between 1 and 99, got {0}")]
    InvalidQuantity(i32),

    #[error("item not on the order: {0}")]
    UnknownItem(String),

    #[error("invalid reason: {0}")]
    InvalidReason(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("version conflict: expected {expected}, stored {actual}")]
    VersionConflict { expected: u64, actual: u64 },
}

impl EngineError {
    /// The caller-observable kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Store(_) => ErrorKind::PersistenceError,
            EngineError::OrderNotFound(_) => ErrorKind::OrderNotFound,
            EngineError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            EngineError::OrderTerminal(_) => ErrorKind::OrderTerminal,
            EngineError::CannotRemoveAllItems => ErrorKind::CannotRemoveAllItems,
            EngineError::CustomerNotRequired => ErrorKind::CustomerNotRequired,
            EngineError::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            EngineError::UnknownItem(_) => ErrorKind::UnknownItem,
            EngineError::InvalidReason(_) => ErrorKind::InvalidReason,
            EngineError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            EngineError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            EngineError::VersionConflict { .. } => ErrorKind::VersionConflict,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind().category()
    }

    /// Message safe to show to the caller
    ///
    /// Validation errors carry the precise reason; concurrency and
    /// infrastructure errors fall back to the generic kind message so
    /// internal state never leaks.
    pub fn public_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => self.to_string(),
            ErrorCategory::Concurrency | ErrorCategory::Infrastructure => {
                self.kind().message().to_string()
            }
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
