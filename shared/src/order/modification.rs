//! Modification audit types and the idempotency ledger entry
//!
//! A [`ModificationRecord`] is created atomically with the order mutation it
//! documents and is never updated or deleted afterwards. Reasons and actions
//! are closed enums so invalid values are rejected at the serde boundary
//! rather than deep in business logic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum length of free-text reason notes
pub const MAX_REASON_NOTES_LEN: usize = 500;

/// Why an accepted order was changed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModificationReason {
    CustomerRequest,
    KitchenError,
    OutOfStock,
    /// Requires non-empty `reason_notes`
    Other,
}

impl std::fmt::Display for ModificationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModificationReason::CustomerRequest => write!(f, "customer_request"),
            ModificationReason::KitchenError => write!(f, "kitchen_error"),
            ModificationReason::OutOfStock => write!(f, "out_of_stock"),
            ModificationReason::Other => write!(f, "other"),
        }
    }
}

/// Requested action on one order item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Remove,
    UpdateQuantity,
}

/// One requested change against an existing order item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChange {
    /// Instance ID of an item currently on the order
    pub item_id: String,
    pub action: ItemAction,
    /// Required for `update_quantity`, must be within [1, 99]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_quantity: Option<i32>,
}

impl ItemChange {
    pub fn remove(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            action: ItemAction::Remove,
            new_quantity: None,
        }
    }

    pub fn update_quantity(item_id: impl Into<String>, new_quantity: i32) -> Self {
        Self {
            item_id: item_id.into(),
            action: ItemAction::UpdateQuantity,
            new_quantity: Some(new_quantity),
        }
    }
}

/// What actually happened to an item, as written to the audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordedAction {
    Removed,
    QuantityChanged,
}

/// Before/after view of one item change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChangeRecord {
    pub item_id: String,
    pub action: RecordedAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_quantity: Option<i32>,
}

/// Immutable audit record, one per applied mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationRecord {
    pub id: String,
    pub order_id: String,
    pub reason: ModificationReason,
    /// Free text, required when `reason` is `other`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_notes: Option<String>,
    /// The staff member confirmed the customer was told about the change
    pub customer_notified: bool,
    /// Staff member who made the change
    pub actor_id: String,
    /// Unix milliseconds, set by the server at commit time
    pub occurred_at: i64,
    pub item_changes: Vec<ItemChangeRecord>,
    pub old_total: Decimal,
    pub new_total: Decimal,
}

impl ModificationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: impl Into<String>,
        reason: ModificationReason,
        reason_notes: Option<String>,
        customer_notified: bool,
        actor_id: impl Into<String>,
        item_changes: Vec<ItemChangeRecord>,
        old_total: Decimal,
        new_total: Decimal,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.into(),
            reason,
            reason_notes,
            customer_notified,
            actor_id: actor_id.into(),
            occurred_at: chrono::Utc::now().timestamp_millis(),
            item_changes,
            old_total,
            new_total,
        }
    }
}

/// Ledger entry marking an idempotency key as consumed
///
/// Created on first successful application of a key; a later request with
/// the same key short-circuits to the recorded result without reapplying
/// effects. Entries are garbage-collected after a retention window since
/// clients do not retry indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyEntry {
    /// Caller-supplied opaque key, unique per logical action
    pub key: String,
    pub order_id: String,
    /// Version the first application produced
    pub result_version: u64,
    /// Advisory refund recorded for cancellations, replayed as-is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_owed: Option<Decimal>,
    /// Unix milliseconds
    pub created_at: i64,
}
