//! Domain events emitted after committed mutations
//!
//! Events are logical facts, broadcast to in-process subscribers after the
//! storage transaction commits. How they reach a browser (websocket, SSE,
//! polling) is a collaborator concern; delivery guarantees belong to the
//! subscriber, not the engine.

use super::modification::ModificationReason;
use super::{OrderStatus, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Domain event for one committed order mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    pub order_id: String,
    /// Order version produced by the mutation this event describes
    pub version: u64,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Staff member who triggered the mutation
    pub actor_id: String,
    pub event_type: OrderEventType,
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderCreated,
    OrderModified,
    OrderCancelled,
    OrderStatusChanged,
    OrderPaymentUpdated,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::OrderCreated => write!(f, "ORDER_CREATED"),
            OrderEventType::OrderModified => write!(f, "ORDER_MODIFIED"),
            OrderEventType::OrderCancelled => write!(f, "ORDER_CANCELLED"),
            OrderEventType::OrderStatusChanged => write!(f, "ORDER_STATUS_CHANGED"),
            OrderEventType::OrderPaymentUpdated => write!(f, "ORDER_PAYMENT_UPDATED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderCreated {
        total: Decimal,
    },

    OrderModified {
        /// Audit record documenting the change
        modification_id: String,
        old_total: Decimal,
        new_total: Decimal,
    },

    OrderCancelled {
        reason: ModificationReason,
        /// Advisory only; refund execution is a collaborator concern
        #[serde(with = "rust_decimal::serde::float")]
        refund_owed: Decimal,
    },

    OrderStatusChanged {
        from: OrderStatus,
        to: OrderStatus,
    },

    OrderPaymentUpdated {
        payment_status: PaymentStatus,
    },
}

impl OrderEvent {
    /// Create a new event stamped with the server clock
    pub fn new(
        order_id: impl Into<String>,
        version: u64,
        actor_id: impl Into<String>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.into(),
            version,
            timestamp: chrono::Utc::now().timestamp_millis(),
            actor_id: actor_id.into(),
            event_type,
            payload,
        }
    }
}
