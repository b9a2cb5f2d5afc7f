//! Cancellation engine
//!
//! Validates cancellation preconditions and computes the advisory refund.
//! Refund execution is a collaborator concern; the engine only records
//! what is owed. A cancelled order keeps its last-known totals; they
//! represent what was owed, not zero.

use super::error::{EngineError, EngineResult};
use rust_decimal::Decimal;
use shared::order::{Order, OrderStatus};

/// Result of a validated cancellation
#[derive(Debug, Clone)]
pub struct Cancellation {
    /// The order with `status = CANCELLED`, totals untouched
    pub order: Order,
    /// Full total if the order was paid, zero otherwise
    pub refund_owed: Decimal,
}

/// Cancel an order
///
/// Pure. The staff member must have confirmed the customer was notified,
/// and the order must not already be terminal. A second cancellation
/// fails fast instead of double-refunding.
pub fn cancel(order: &Order, customer_notified: bool) -> EngineResult<Cancellation> {
    if !customer_notified {
        return Err(EngineError::CustomerNotRequired);
    }
    if order.status.is_terminal() {
        return Err(EngineError::OrderTerminal(order.status));
    }

    let refund_owed = if order.is_paid() {
        order.total
    } else {
        Decimal::ZERO
    };

    let mut cancelled = order.clone();
    cancelled.status = OrderStatus::Cancelled;

    Ok(Cancellation {
        order: cancelled,
        refund_owed,
    })
}
