//! Item modification engine
//!
//! Computes the effect of a change set (removals and quantity updates)
//! against an order snapshot. Pure: validates everything, applies removals
//! first and quantity updates second, recomputes totals from the order's
//! captured rates, and returns the new item list plus the audit diff. The
//! caller persists the result; on any error nothing has changed.

use super::error::{EngineError, EngineResult};
use super::money::{self, Totals};
use shared::order::modification::{ItemAction, ItemChange, ItemChangeRecord, RecordedAction};
use shared::order::{MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY, Order, OrderItem};

/// Result of applying a change set to an order snapshot
#[derive(Debug, Clone)]
pub struct AppliedChanges {
    /// Items after removals and quantity updates
    pub items: Vec<OrderItem>,
    /// Totals recomputed from the order's captured rates
    pub totals: Totals,
    /// Audit diff, one record per requested change
    pub records: Vec<ItemChangeRecord>,
}

/// Apply item-level changes to an order snapshot
///
/// Preconditions: order not terminal, change set non-empty, every change
/// references an item present at the time it is applied, quantities within
/// [1, 99]. Removing every item is rejected; the order must be cancelled
/// instead.
pub fn apply_item_changes(order: &Order, changes: &[ItemChange]) -> EngineResult<AppliedChanges> {
    if order.status.is_terminal() {
        return Err(EngineError::OrderTerminal(order.status));
    }
    if changes.is_empty() {
        return Err(EngineError::InvalidOperation(
            "change set is empty".to_string(),
        ));
    }

    let mut items = order.items.clone();
    let mut records = Vec::with_capacity(changes.len());

    // Removals first. A duplicate removal, or any reference to an item not
    // on the order, rejects the whole change set.
    for change in changes
        .iter()
        .filter(|c| c.action == ItemAction::Remove)
    {
        let pos = items
            .iter()
            .position(|i| i.id == change.item_id)
            .ok_or_else(|| EngineError::UnknownItem(change.item_id.clone()))?;
        let removed = items.remove(pos);
        records.push(ItemChangeRecord {
            item_id: removed.id.clone(),
            action: RecordedAction::Removed,
            old_quantity: Some(removed.quantity),
            new_quantity: None,
        });
    }

    // Then quantity updates. An update aimed at an item removed by the same
    // change set fails as unknown: the change set contradicts itself.
    for change in changes
        .iter()
        .filter(|c| c.action == ItemAction::UpdateQuantity)
    {
        let quantity = change
            .new_quantity
            .ok_or(EngineError::InvalidQuantity(0))?;
        if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&quantity) {
            return Err(EngineError::InvalidQuantity(quantity));
        }
        let item = items
            .iter_mut()
            .find(|i| i.id == change.item_id)
            .ok_or_else(|| EngineError::UnknownItem(change.item_id.clone()))?;
        let old_quantity = item.quantity;
        *item = item.with_quantity(quantity);
        records.push(ItemChangeRecord {
            item_id: change.item_id.clone(),
            action: RecordedAction::QuantityChanged,
            old_quantity: Some(old_quantity),
            new_quantity: Some(quantity),
        });
    }

    if items.is_empty() {
        return Err(EngineError::CannotRemoveAllItems);
    }

    let totals = money::compute_totals(&items, order.tax_rate, order.service_charge_rate);

    Ok(AppliedChanges {
        items,
        totals,
        records,
    })
}
