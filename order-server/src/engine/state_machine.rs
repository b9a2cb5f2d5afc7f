//! Order status state machine
//!
//! ```text
//! pending → confirmed → preparing → ready → served
//!     └─────────┴───────────┴────────┘
//!                   ↓
//!               cancelled
//! ```
//!
//! `served` and `cancelled` are terminal. Transitions change `status` only;
//! monetary fields are never touched by a status change.

use super::error::{EngineError, EngineResult};
use shared::order::{Order, OrderStatus};

/// Whether `from → to` is a valid lifecycle edge
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Confirmed, Preparing)
            | (Preparing, Ready)
            | (Ready, Served)
            | (Pending | Confirmed | Preparing | Ready, Cancelled)
    )
}

/// Apply a status transition
///
/// Pure: returns a new order with `status` replaced, or a typed error.
/// Version and timestamps are stamped by the caller at commit time.
pub fn transition(order: &Order, target: OrderStatus) -> EngineResult<Order> {
    if order.status.is_terminal() {
        return Err(EngineError::OrderTerminal(order.status));
    }
    if !can_transition(order.status, target) {
        return Err(EngineError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }
    let mut next = order.clone();
    next.status = target;
    Ok(next)
}
