//! Inbound mutation request DTOs
//!
//! Every mutation carries the version the caller read (`expectedVersion`)
//! and a client-minted idempotency key, unique per logical user action. A
//! retried request reuses the key; a new user action mints a new one.
//! Envelope keys are camelCase on the wire.

use crate::order::modification::{ItemChange, ModificationReason};
use crate::order::{OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/orders/{id}/modify`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyOrderRequest {
    pub expected_version: u64,
    pub idempotency_key: String,
    pub reason: ModificationReason,
    /// Required when `reason` is `other`, max 500 chars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_notes: Option<String>,
    /// Must be true for the mutation to be accepted
    pub customer_notified: bool,
    pub item_changes: Vec<ItemChange>,
}

/// Body of `POST /api/orders/{id}/cancel`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    pub expected_version: u64,
    pub idempotency_key: String,
    pub reason: ModificationReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_notes: Option<String>,
    /// Must be true for the cancellation to be accepted
    pub customer_notified: bool,
}

/// Body of `POST /api/orders/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub expected_version: u64,
    pub idempotency_key: String,
    pub target_status: OrderStatus,
}

/// Body of `POST /api/orders/{id}/payment`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub expected_version: u64,
    pub idempotency_key: String,
    pub payment_status: PaymentStatus,
}
