//! Order domain model
//!
//! The order record is the unit of optimistic concurrency: every accepted
//! mutation (status change, item change, cancellation, payment update)
//! increments `version` by exactly 1, and writers must present the version
//! they read. Monetary fields are `Decimal` and are kept consistent with
//! `items` at all times (`total = subtotal + tax + service_charge`).

pub mod event;
pub mod modification;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Minimum quantity for a single order item
pub const MIN_ITEM_QUANTITY: i32 = 1;

/// Maximum quantity for a single order item
pub const MAX_ITEM_QUANTITY: i32 = 99;

/// Order lifecycle status
///
/// Valid transitions move forward through the kitchen/service pipeline
/// (pending → confirmed → preparing → ready → served) or jump to
/// `Cancelled` from any non-terminal state. `Served` and `Cancelled` are
/// terminal: no further mutation of any kind is accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no transitions, modifications, or cancellations.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Served | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Confirmed => write!(f, "CONFIRMED"),
            OrderStatus::Preparing => write!(f, "PREPARING"),
            OrderStatus::Ready => write!(f, "READY"),
            OrderStatus::Served => write!(f, "SERVED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Payment status, independent of the kitchen/service lifecycle
///
/// An order can be paid at any point before or after serving; cancellation
/// of a paid order owes the customer a manual refund of the full total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

/// A single line on an order
///
/// `unit_price` is a snapshot taken when the item was placed and never
/// changes afterwards; menu price edits do not retroactively reprice open
/// orders. `line_total` is always `unit_price × quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Item instance ID (unique within the order)
    pub id: String,
    /// Menu item this line was created from
    pub menu_item_id: String,
    /// Display name snapshot
    pub name: String,
    /// Quantity, always within [1, 99]
    pub quantity: i32,
    /// Price per unit at order time (immutable)
    pub unit_price: Decimal,
    /// `unit_price × quantity`
    pub line_total: Decimal,
}

impl OrderItem {
    /// Create a new line with a fresh instance ID
    pub fn new(
        menu_item_id: impl Into<String>,
        name: impl Into<String>,
        quantity: i32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            menu_item_id: menu_item_id.into(),
            name: name.into(),
            quantity,
            unit_price,
            line_total: unit_price * Decimal::from(quantity),
        }
    }

    /// Copy of this line with a different quantity and recomputed total
    pub fn with_quantity(&self, quantity: i32) -> Self {
        Self {
            quantity,
            line_total: self.unit_price * Decimal::from(quantity),
            ..self.clone()
        }
    }
}

/// Durable order record
///
/// Invariants:
/// - `items` is never empty for a live order (removing the last item is
///   rejected; the order must be cancelled instead)
/// - `version` increments by exactly 1 per accepted mutation
/// - `tax_rate` / `service_charge_rate` are captured at creation and never
///   change; totals are always recomputed from them, never back-derived
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Opaque identifier, immutable
    pub id: String,
    pub status: OrderStatus,
    /// Optimistic concurrency version
    pub version: u64,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    /// `subtotal + tax + service_charge`
    pub total: Decimal,
    /// Effective tax rate, captured at creation
    pub tax_rate: Decimal,
    /// Effective service charge rate, captured at creation
    pub service_charge_rate: Decimal,
    pub payment_status: PaymentStatus,
    /// Unix milliseconds
    pub created_at: i64,
    /// Unix milliseconds, touched on every accepted mutation
    pub updated_at: i64,
}

impl Order {
    /// Find an item by instance ID
    pub fn find_item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// Input for creating a new order
///
/// Rates are supplied here once and become immutable on the created order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<DraftItem>,
    pub tax_rate: Decimal,
    pub service_charge_rate: Decimal,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// A line in an [`OrderDraft`], before instance IDs are assigned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Served.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");
        let back: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }

    #[test]
    fn item_line_total() {
        let item = OrderItem::new("menu-1", "Burger", 2, Decimal::from_str("10.00").unwrap());
        assert_eq!(item.line_total, Decimal::from_str("20.00").unwrap());

        let bumped = item.with_quantity(3);
        assert_eq!(bumped.line_total, Decimal::from_str("30.00").unwrap());
        assert_eq!(bumped.id, item.id);
        assert_eq!(bumped.unit_price, item.unit_price);
    }
}
