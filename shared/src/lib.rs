//! Shared types for the order lifecycle engine
//!
//! Domain model, error taxonomy, and transport DTOs used by the server and
//! by any client that speaks to it. This crate holds no business logic,
//! only the types both sides of the wire must agree on.

pub mod error;
pub mod order;
pub mod request;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ErrorCategory, ErrorKind};
pub use order::{Order, OrderDraft, OrderItem, OrderStatus, PaymentStatus};
pub use order::event::{EventPayload, OrderEvent, OrderEventType};
pub use order::modification::{
    IdempotencyEntry, ItemAction, ItemChange, ItemChangeRecord, ModificationReason,
    ModificationRecord,
};
pub use response::{ApiResponse, OperationResult, OperationStatus};
