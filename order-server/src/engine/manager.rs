//! OrderManager - the concurrency controller
//!
//! Makes the pure engine functions safe under concurrent callers acting on
//! the same order.
//!
//! # Mutation Flow
//!
//! ```text
//! execute(cmd)
//!     ├─ 1. Idempotency ledger lookup (replay recorded result on hit)
//!     ├─ 2. Load order, gate on expected_version
//!     ├─ 3. Run the pure operation (state machine / modify / cancel)
//!     ├─ 4. Atomic commit: order + audit record + ledger entry (CAS)
//!     ├─ 5. Broadcast domain event
//!     └─ 6. Return outcome
//! ```
//!
//! No locks are held across the caller's read-modify-write window; the
//! version comparison inside the commit transaction is the sole
//! serialization point. Exactly one of N concurrent writers on the same
//! version succeeds; the rest see `VersionConflict` and must re-fetch.
//! Retry policy belongs to the caller; nothing here blocks or loops.

use super::cancel;
use super::error::{EngineError, EngineResult};
use super::modify;
use super::money;
use super::state_machine;
use super::store::{CommitOutcome, OrderStore};
use crate::utils::validation::validate_reason;
use chrono::Utc;
use rust_decimal::Decimal;
use shared::order::event::{EventPayload, OrderEvent, OrderEventType};
use shared::order::modification::{
    IdempotencyEntry, ItemChange, ModificationReason, ModificationRecord,
};
use shared::order::{
    MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY, Order, OrderDraft, OrderItem, OrderStatus,
    PaymentStatus,
};
use std::path::Path;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Rates are fractions of the subtotal; anything above 100% is a typo
const MAX_RATE: Decimal = Decimal::ONE;

/// One requested mutation against an order
#[derive(Debug, Clone)]
pub struct MutationCommand {
    pub order_id: String,
    /// Version the caller read; the mutation only applies against it
    pub expected_version: u64,
    /// Client-minted key, unique per logical user action
    pub idempotency_key: String,
    /// Staff member performing the change
    pub actor_id: String,
    pub payload: MutationPayload,
}

/// The operation to run against the loaded order
#[derive(Debug, Clone)]
pub enum MutationPayload {
    ModifyItems {
        changes: Vec<ItemChange>,
        reason: ModificationReason,
        reason_notes: Option<String>,
        customer_notified: bool,
    },
    Cancel {
        reason: ModificationReason,
        reason_notes: Option<String>,
        customer_notified: bool,
    },
    ChangeStatus {
        target: OrderStatus,
    },
    SetPaymentStatus {
        payment_status: PaymentStatus,
    },
}

/// Outcome of one accepted (or replayed) mutation
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub order: Order,
    /// Audit record written for modifications and cancellations
    pub modification: Option<ModificationRecord>,
    /// Advisory refund, present for cancellations only
    pub refund_owed: Option<Decimal>,
    /// True when the idempotency ledger answered instead of the engine
    pub replayed: bool,
}

/// Concurrency controller over the order store
pub struct OrderManager {
    store: OrderStore,
    event_tx: broadcast::Sender<OrderEvent>,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("store", &"<OrderStore>")
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl OrderManager {
    /// Open the manager over a database file
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let store = OrderStore::open(path)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self { store, event_tx })
    }

    /// In-memory manager (tests, ephemeral dev runs)
    pub fn open_in_memory() -> EngineResult<Self> {
        let store = OrderStore::open_in_memory()?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self { store, event_tx })
    }

    /// Subscribe to domain events emitted after committed mutations
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    // ========== Creation and reads ==========

    /// Create an order from a draft
    ///
    /// Rates are captured here and never change for the life of the order.
    /// The order starts at version 0 in `PENDING`.
    pub fn create_order(&self, draft: OrderDraft, actor_id: &str) -> EngineResult<Order> {
        if draft.items.is_empty() {
            return Err(EngineError::InvalidOperation(
                "order must contain at least one item".to_string(),
            ));
        }
        if draft.tax_rate < Decimal::ZERO
            || draft.tax_rate > MAX_RATE
            || draft.service_charge_rate < Decimal::ZERO
            || draft.service_charge_rate > MAX_RATE
        {
            return Err(EngineError::InvalidAmount(format!(
                "rates must be within [0, 1], got tax {} / service {}",
                draft.tax_rate, draft.service_charge_rate
            )));
        }

        let mut items = Vec::with_capacity(draft.items.len());
        for line in &draft.items {
            if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&line.quantity) {
                return Err(EngineError::InvalidQuantity(line.quantity));
            }
            if line.unit_price < Decimal::ZERO || line.unit_price > money::MAX_UNIT_PRICE {
                return Err(EngineError::InvalidAmount(format!(
                    "unit price out of range: {}",
                    line.unit_price
                )));
            }
            items.push(OrderItem::new(
                line.menu_item_id.clone(),
                line.name.clone(),
                line.quantity,
                line.unit_price,
            ));
        }

        let totals = money::compute_totals(&items, draft.tax_rate, draft.service_charge_rate);
        let now = Utc::now().timestamp_millis();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            status: OrderStatus::Pending,
            version: 0,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            service_charge: totals.service_charge,
            total: totals.total,
            tax_rate: draft.tax_rate,
            service_charge_rate: draft.service_charge_rate,
            payment_status: draft.payment_status,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_order(&order)?;
        tracing::info!(order_id = %order.id, total = %order.total, "order created");

        self.emit(
            &order,
            actor_id,
            OrderEventType::OrderCreated,
            EventPayload::OrderCreated { total: order.total },
        );
        Ok(order)
    }

    /// Load an order by ID
    pub fn get_order(&self, order_id: &str) -> EngineResult<Order> {
        self.store
            .load_order(order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))
    }

    /// All orders not yet served or cancelled
    pub fn list_active(&self) -> EngineResult<Vec<Order>> {
        Ok(self.store.list_active_orders()?)
    }

    /// Audit trail for an order, oldest first
    pub fn modifications(&self, order_id: &str) -> EngineResult<Vec<ModificationRecord>> {
        // 404 for unknown orders rather than an empty trail
        self.get_order(order_id)?;
        Ok(self.store.modifications_for(order_id)?)
    }

    // ========== Mutations ==========

    /// Execute one mutation under the optimistic-concurrency contract
    pub fn execute(&self, cmd: MutationCommand) -> EngineResult<MutationOutcome> {
        // 1. Ledger fast path: a retried request must not reapply effects.
        if let Some(entry) = self.store.get_idempotency(&cmd.idempotency_key)? {
            tracing::debug!(
                key = %cmd.idempotency_key,
                order_id = %entry.order_id,
                "idempotency ledger hit - replaying recorded result"
            );
            return self.replay(entry);
        }

        // 2. Load and gate on the version the caller read.
        let order = self
            .store
            .load_order(&cmd.order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(cmd.order_id.clone()))?;
        if order.version != cmd.expected_version {
            return Err(EngineError::VersionConflict {
                expected: cmd.expected_version,
                actual: order.version,
            });
        }

        // 3. Pure operation against the loaded snapshot.
        let (mut next, record, refund_owed, event_type, payload) =
            self.run_operation(&order, &cmd)?;

        next.version = order.version + 1;
        next.updated_at = Utc::now().timestamp_millis();

        let entry = IdempotencyEntry {
            key: cmd.idempotency_key.clone(),
            order_id: cmd.order_id.clone(),
            result_version: next.version,
            refund_owed,
            created_at: next.updated_at,
        };

        // 4. Atomic CAS commit; on any failure nothing is persisted.
        match self
            .store
            .commit_mutation(cmd.expected_version, &next, record.as_ref(), &entry)?
        {
            CommitOutcome::Committed => {
                tracing::info!(
                    order_id = %next.id,
                    version = next.version,
                    event = %event_type,
                    "mutation committed"
                );
                self.emit(&next, &cmd.actor_id, event_type, payload);
                Ok(MutationOutcome {
                    order: next,
                    modification: record,
                    refund_owed,
                    replayed: false,
                })
            }
            // Another writer won between our read and the commit.
            CommitOutcome::Conflict { actual } => Err(EngineError::VersionConflict {
                expected: cmd.expected_version,
                actual,
            }),
            // A concurrent retry with the same key won the race.
            CommitOutcome::Duplicate(entry) => self.replay(entry),
            CommitOutcome::Missing => Err(EngineError::OrderNotFound(cmd.order_id.clone())),
        }
    }

    /// Prune ledger entries older than the retention window
    pub fn prune_idempotency(&self, retention_hours: u64) -> EngineResult<usize> {
        let cutoff = Utc::now().timestamp_millis() - (retention_hours as i64) * 3_600_000;
        Ok(self.store.prune_idempotency(cutoff)?)
    }

    // ========== Internals ==========

    #[allow(clippy::type_complexity)]
    fn run_operation(
        &self,
        order: &Order,
        cmd: &MutationCommand,
    ) -> EngineResult<(
        Order,
        Option<ModificationRecord>,
        Option<Decimal>,
        OrderEventType,
        EventPayload,
    )> {
        match &cmd.payload {
            MutationPayload::ModifyItems {
                changes,
                reason,
                reason_notes,
                customer_notified,
            } => {
                if !customer_notified {
                    return Err(EngineError::CustomerNotRequired);
                }
                validate_reason(*reason, reason_notes)?;

                let applied = modify::apply_item_changes(order, changes)?;
                let record = ModificationRecord::new(
                    &order.id,
                    *reason,
                    reason_notes.clone(),
                    true,
                    &cmd.actor_id,
                    applied.records,
                    order.total,
                    applied.totals.total,
                );

                let mut next = order.clone();
                next.items = applied.items;
                next.subtotal = applied.totals.subtotal;
                next.tax = applied.totals.tax;
                next.service_charge = applied.totals.service_charge;
                next.total = applied.totals.total;

                let payload = EventPayload::OrderModified {
                    modification_id: record.id.clone(),
                    old_total: order.total,
                    new_total: next.total,
                };
                Ok((
                    next,
                    Some(record),
                    None,
                    OrderEventType::OrderModified,
                    payload,
                ))
            }

            MutationPayload::Cancel {
                reason,
                reason_notes,
                customer_notified,
            } => {
                validate_reason(*reason, reason_notes)?;
                let cancellation = cancel::cancel(order, *customer_notified)?;
                // Totals are untouched by cancellation; the record documents
                // the lifecycle change itself.
                let record = ModificationRecord::new(
                    &order.id,
                    *reason,
                    reason_notes.clone(),
                    true,
                    &cmd.actor_id,
                    vec![],
                    order.total,
                    order.total,
                );
                let payload = EventPayload::OrderCancelled {
                    reason: *reason,
                    refund_owed: cancellation.refund_owed,
                };
                Ok((
                    cancellation.order,
                    Some(record),
                    Some(cancellation.refund_owed),
                    OrderEventType::OrderCancelled,
                    payload,
                ))
            }

            MutationPayload::ChangeStatus { target } => {
                let next = state_machine::transition(order, *target)?;
                let payload = EventPayload::OrderStatusChanged {
                    from: order.status,
                    to: *target,
                };
                Ok((next, None, None, OrderEventType::OrderStatusChanged, payload))
            }

            MutationPayload::SetPaymentStatus { payment_status } => {
                // Payment can settle after serving, but a cancelled order is
                // closed for good.
                if order.status == OrderStatus::Cancelled {
                    return Err(EngineError::OrderTerminal(order.status));
                }
                let mut next = order.clone();
                next.payment_status = *payment_status;
                let payload = EventPayload::OrderPaymentUpdated {
                    payment_status: *payment_status,
                };
                Ok((next, None, None, OrderEventType::OrderPaymentUpdated, payload))
            }
        }
    }

    /// Rebuild the response for a consumed idempotency key
    ///
    /// No recomputation, no new audit record: the order as stored plus the
    /// record written at `result_version` (if the operation produced one).
    fn replay(&self, entry: IdempotencyEntry) -> EngineResult<MutationOutcome> {
        let order = self
            .store
            .load_order(&entry.order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(entry.order_id.clone()))?;
        let modification = self
            .store
            .modification_at(&entry.order_id, entry.result_version)?;
        Ok(MutationOutcome {
            order,
            modification,
            refund_owed: entry.refund_owed,
            replayed: true,
        })
    }

    fn emit(
        &self,
        order: &Order,
        actor_id: &str,
        event_type: OrderEventType,
        payload: EventPayload,
    ) {
        // send() only fails when nobody is subscribed, which is fine
        let _ = self.event_tx.send(OrderEvent::new(
            &order.id,
            order.version,
            actor_id,
            event_type,
            payload,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{d, draft};
    use shared::order::modification::RecordedAction;

    fn modify_cmd(order: &Order, key: &str, changes: Vec<ItemChange>) -> MutationCommand {
        MutationCommand {
            order_id: order.id.clone(),
            expected_version: order.version,
            idempotency_key: key.to_string(),
            actor_id: "staff-1".to_string(),
            payload: MutationPayload::ModifyItems {
                changes,
                reason: ModificationReason::CustomerRequest,
                reason_notes: None,
                customer_notified: true,
            },
        }
    }

    fn cancel_cmd(order: &Order, key: &str) -> MutationCommand {
        MutationCommand {
            order_id: order.id.clone(),
            expected_version: order.version,
            idempotency_key: key.to_string(),
            actor_id: "staff-1".to_string(),
            payload: MutationPayload::Cancel {
                reason: ModificationReason::CustomerRequest,
                reason_notes: None,
                customer_notified: true,
            },
        }
    }

    fn status_cmd(order: &Order, key: &str, target: OrderStatus) -> MutationCommand {
        MutationCommand {
            order_id: order.id.clone(),
            expected_version: order.version,
            idempotency_key: key.to_string(),
            actor_id: "staff-1".to_string(),
            payload: MutationPayload::ChangeStatus { target },
        }
    }

    #[test]
    fn create_computes_totals_from_rates() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();
        assert_eq!(order.version, 0);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal, d("23.00"));
        assert_eq!(order.tax, d("2.30"));
        assert_eq!(order.service_charge, d("1.15"));
        assert_eq!(order.total, d("26.45"));
    }

    #[test]
    fn create_rejects_empty_and_invalid_drafts() {
        let manager = OrderManager::open_in_memory().unwrap();

        let mut empty = draft();
        empty.items.clear();
        assert!(matches!(
            manager.create_order(empty, "staff-1").unwrap_err(),
            EngineError::InvalidOperation(_)
        ));

        let mut bad_qty = draft();
        bad_qty.items[0].quantity = 0;
        assert!(matches!(
            manager.create_order(bad_qty, "staff-1").unwrap_err(),
            EngineError::InvalidQuantity(0)
        ));

        let mut bad_price = draft();
        bad_price.items[0].unit_price = d("-1.00");
        assert!(matches!(
            manager.create_order(bad_price, "staff-1").unwrap_err(),
            EngineError::InvalidAmount(_)
        ));

        let mut bad_rate = draft();
        bad_rate.tax_rate = d("1.5");
        assert!(matches!(
            manager.create_order(bad_rate, "staff-1").unwrap_err(),
            EngineError::InvalidAmount(_)
        ));
    }

    #[test]
    fn modify_recomputes_and_audits() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();
        let fries = order.items[1].id.clone();

        let outcome = manager
            .execute(modify_cmd(&order, "k1", vec![ItemChange::remove(&fries)]))
            .unwrap();

        assert_eq!(outcome.order.version, 1);
        assert_eq!(outcome.order.total, d("23.00"));
        assert!(!outcome.replayed);

        let record = outcome.modification.unwrap();
        assert_eq!(record.old_total, d("26.45"));
        assert_eq!(record.new_total, d("23.00"));
        assert_eq!(record.item_changes.len(), 1);
        assert_eq!(record.item_changes[0].action, RecordedAction::Removed);

        assert_eq!(manager.modifications(&order.id).unwrap().len(), 1);
    }

    #[test]
    fn every_accepted_mutation_bumps_version_by_one() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();
        let burger = order.items[0].id.clone();

        let after_modify = manager
            .execute(modify_cmd(
                &order,
                "k1",
                vec![ItemChange::update_quantity(&burger, 3)],
            ))
            .unwrap()
            .order;
        assert_eq!(after_modify.version, 1);

        let after_status = manager
            .execute(status_cmd(&after_modify, "k2", OrderStatus::Confirmed))
            .unwrap()
            .order;
        assert_eq!(after_status.version, 2);

        let after_cancel = manager
            .execute(cancel_cmd(&after_status, "k3"))
            .unwrap()
            .order;
        assert_eq!(after_cancel.version, 3);
        assert_eq!(after_cancel.status, OrderStatus::Cancelled);
    }

    #[test]
    fn stale_version_is_conflict() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();
        let burger = order.items[0].id.clone();

        manager
            .execute(modify_cmd(
                &order,
                "k1",
                vec![ItemChange::update_quantity(&burger, 3)],
            ))
            .unwrap();

        // second writer still holds version 0
        let err = manager
            .execute(modify_cmd(
                &order,
                "k2",
                vec![ItemChange::update_quantity(&burger, 4)],
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::VersionConflict {
                expected: 0,
                actual: 1
            }
        ));

        // the losing write changed nothing
        let current = manager.get_order(&order.id).unwrap();
        assert_eq!(current.version, 1);
        assert_eq!(current.items[0].quantity, 3);
        assert_eq!(manager.modifications(&order.id).unwrap().len(), 1);
    }

    #[test]
    fn retried_key_replays_without_reapplying() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();
        let fries = order.items[1].id.clone();

        let first = manager
            .execute(modify_cmd(&order, "retry-key", vec![ItemChange::remove(&fries)]))
            .unwrap();
        // the retry carries a stale version and a different payload; the
        // ledger answers before any of that is looked at
        let retry = manager
            .execute(modify_cmd(&order, "retry-key", vec![]))
            .unwrap();

        assert!(retry.replayed);
        assert_eq!(retry.order.version, first.order.version);
        assert_eq!(
            retry.modification.as_ref().unwrap().id,
            first.modification.as_ref().unwrap().id
        );
        // exactly one audit record
        assert_eq!(manager.modifications(&order.id).unwrap().len(), 1);
    }

    #[test]
    fn cancel_computes_advisory_refund() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();

        let paid = manager
            .execute(MutationCommand {
                order_id: order.id.clone(),
                expected_version: 0,
                idempotency_key: "pay".to_string(),
                actor_id: "staff-1".to_string(),
                payload: MutationPayload::SetPaymentStatus {
                    payment_status: PaymentStatus::Paid,
                },
            })
            .unwrap()
            .order;

        let outcome = manager.execute(cancel_cmd(&paid, "cancel")).unwrap();
        assert_eq!(outcome.refund_owed, Some(d("26.45")));
        assert_eq!(outcome.order.status, OrderStatus::Cancelled);
        // totals kept for record-keeping
        assert_eq!(outcome.order.total, d("26.45"));
    }

    #[test]
    fn cancel_unpaid_owes_zero_and_replays_identically() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();

        let first = manager.execute(cancel_cmd(&order, "c1")).unwrap();
        assert_eq!(first.refund_owed, Some(Decimal::ZERO));

        let replay = manager.execute(cancel_cmd(&order, "c1")).unwrap();
        assert!(replay.replayed);
        assert_eq!(replay.refund_owed, Some(Decimal::ZERO));

        // a *new* cancellation attempt fails fast instead of double-refunding
        let fresh = manager.get_order(&order.id).unwrap();
        let err = manager.execute(cancel_cmd(&fresh, "c2")).unwrap_err();
        assert!(matches!(err, EngineError::OrderTerminal(_)));
    }

    #[test]
    fn terminal_orders_reject_all_mutations() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();
        let cancelled = manager.execute(cancel_cmd(&order, "c1")).unwrap().order;
        let burger = cancelled.items[0].id.clone();

        let err = manager
            .execute(modify_cmd(
                &cancelled,
                "m1",
                vec![ItemChange::update_quantity(&burger, 1)],
            ))
            .unwrap_err();
        assert!(matches!(err, EngineError::OrderTerminal(_)));

        let err = manager
            .execute(status_cmd(&cancelled, "s1", OrderStatus::Confirmed))
            .unwrap_err();
        assert!(matches!(err, EngineError::OrderTerminal(_)));

        // rejected mutations leave the version untouched
        assert_eq!(manager.get_order(&order.id).unwrap().version, cancelled.version);
    }

    #[test]
    fn status_walk_to_served() {
        let manager = OrderManager::open_in_memory().unwrap();
        let mut order = manager.create_order(draft(), "staff-1").unwrap();

        for (i, target) in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
        ]
        .into_iter()
        .enumerate()
        {
            order = manager
                .execute(status_cmd(&order, &format!("s{i}"), target))
                .unwrap()
                .order;
            assert_eq!(order.status, target);
            // status changes never alter money
            assert_eq!(order.total, d("26.45"));
        }
        assert_eq!(order.version, 4);

        // served is terminal
        let err = manager
            .execute(status_cmd(&order, "s9", OrderStatus::Cancelled))
            .unwrap_err();
        assert!(matches!(err, EngineError::OrderTerminal(_)));
    }

    #[test]
    fn customer_must_be_notified_for_modify() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();
        let burger = order.items[0].id.clone();

        let mut cmd = modify_cmd(&order, "k1", vec![ItemChange::update_quantity(&burger, 3)]);
        if let MutationPayload::ModifyItems {
            customer_notified, ..
        } = &mut cmd.payload
        {
            *customer_notified = false;
        }
        let err = manager.execute(cmd).unwrap_err();
        assert!(matches!(err, EngineError::CustomerNotRequired));
        assert_eq!(manager.get_order(&order.id).unwrap().version, 0);
    }

    #[test]
    fn other_reason_requires_notes() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();
        let burger = order.items[0].id.clone();

        let mut cmd = modify_cmd(&order, "k1", vec![ItemChange::update_quantity(&burger, 3)]);
        if let MutationPayload::ModifyItems { reason, .. } = &mut cmd.payload {
            *reason = ModificationReason::Other;
        }
        let err = manager.execute(cmd).unwrap_err();
        assert!(matches!(err, EngineError::InvalidReason(_)));
    }

    #[test]
    fn conservation_across_repeated_edits() {
        let manager = OrderManager::open_in_memory().unwrap();
        let mut order = manager.create_order(draft(), "staff-1").unwrap();
        let burger = order.items[0].id.clone();

        for (i, qty) in [7, 13, 1, 42, 99].into_iter().enumerate() {
            order = manager
                .execute(modify_cmd(
                    &order,
                    &format!("edit-{i}"),
                    vec![ItemChange::update_quantity(&burger, qty)],
                ))
                .unwrap()
                .order;
            assert_eq!(
                order.total,
                order.subtotal + order.tax + order.service_charge,
                "conservation after edit {i}"
            );
        }
    }

    #[test]
    fn payment_update_is_versioned_but_unaudited() {
        let manager = OrderManager::open_in_memory().unwrap();
        let order = manager.create_order(draft(), "staff-1").unwrap();

        let outcome = manager
            .execute(MutationCommand {
                order_id: order.id.clone(),
                expected_version: 0,
                idempotency_key: "pay".to_string(),
                actor_id: "staff-1".to_string(),
                payload: MutationPayload::SetPaymentStatus {
                    payment_status: PaymentStatus::Paid,
                },
            })
            .unwrap();
        assert_eq!(outcome.order.version, 1);
        assert!(outcome.order.is_paid());
        assert!(outcome.modification.is_none());
        assert!(manager.modifications(&order.id).unwrap().is_empty());
    }

    #[test]
    fn events_are_broadcast_after_commit() {
        let manager = OrderManager::open_in_memory().unwrap();
        let mut rx = manager.subscribe();

        let order = manager.create_order(draft(), "staff-1").unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type, OrderEventType::OrderCreated);
        assert_eq!(event.order_id, order.id);

        manager
            .execute(status_cmd(&order, "s1", OrderStatus::Confirmed))
            .unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type, OrderEventType::OrderStatusChanged);
        assert_eq!(event.version, 1);

        // a failed mutation emits nothing
        let _ = manager
            .execute(status_cmd(&order, "s2", OrderStatus::Served))
            .unwrap_err();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unknown_order_is_not_found() {
        let manager = OrderManager::open_in_memory().unwrap();
        let err = manager.get_order("nope").unwrap_err();
        assert!(matches!(err, EngineError::OrderNotFound(_)));

        let err = manager.modifications("nope").unwrap_err();
        assert!(matches!(err, EngineError::OrderNotFound(_)));
    }

    #[test]
    fn list_active_excludes_terminal() {
        let manager = OrderManager::open_in_memory().unwrap();
        let a = manager.create_order(draft(), "staff-1").unwrap();
        let b = manager.create_order(draft(), "staff-1").unwrap();
        manager.execute(cancel_cmd(&b, "c1")).unwrap();

        let active = manager.list_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);
    }
}
