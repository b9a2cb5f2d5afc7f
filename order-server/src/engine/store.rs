//! redb-based storage for orders, audit records, and the idempotency ledger
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | Current order state + version |
//! | `modifications` | `(order_id, version)` | `ModificationRecord` (JSON) | Append-only audit trail |
//! | `idempotency` | `key` | `IdempotencyEntry` (JSON) | Retry detection ledger |
//!
//! # Atomicity
//!
//! [`OrderStore::commit_mutation`] is the single serialization point: one
//! write transaction re-checks the idempotency key and the stored version,
//! then writes order + audit record + ledger entry together. redb commits
//! are durable when `commit()` returns (copy-on-write with atomic pointer
//! swap), so a power cut leaves either the old state or the new state,
//! never a mix.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition,
};
use shared::order::modification::{IdempotencyEntry, ModificationRecord};
use shared::order::Order;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Current order state: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Audit trail: key = (order_id, version), value = JSON-serialized ModificationRecord
const MODIFICATIONS_TABLE: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("modifications");

/// Idempotency ledger: key = idempotency key, value = JSON-serialized IdempotencyEntry
const IDEMPOTENCY_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("idempotency");

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// How an atomic commit attempt ended
#[derive(Debug)]
pub enum CommitOutcome {
    /// Everything written and durable
    Committed,
    /// Stored version no longer matches what the caller read
    Conflict { actual: u64 },
    /// Another request already consumed this idempotency key
    Duplicate(IdempotencyEntry),
    /// The order vanished between read and commit
    Missing,
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
}

impl OrderStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (tests, ephemeral dev runs)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(MODIFICATIONS_TABLE)?;
            let _ = write_txn.open_table(IDEMPOTENCY_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Orders ==========

    /// Insert a freshly created order
    pub fn insert_order(&self, order: &Order) -> StoreResult<()> {
        let bytes = serde_json::to_vec(order)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            table.insert(order.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load an order by ID
    pub fn load_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All orders not yet served or cancelled
    pub fn list_active_orders(&self) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if !order.status.is_terminal() {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    // ========== Audit trail ==========

    /// All modification records for an order, oldest first
    pub fn modifications_for(&self, order_id: &str) -> StoreResult<Vec<ModificationRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MODIFICATIONS_TABLE)?;
        let mut records = Vec::new();
        for entry in table.range((order_id, 0)..=(order_id, u64::MAX))? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    /// The modification record produced at a specific version, if any
    pub fn modification_at(
        &self,
        order_id: &str,
        version: u64,
    ) -> StoreResult<Option<ModificationRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MODIFICATIONS_TABLE)?;
        match table.get((order_id, version))? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    // ========== Idempotency ledger ==========

    /// Look up a previously consumed idempotency key
    pub fn get_idempotency(&self, key: &str) -> StoreResult<Option<IdempotencyEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(IDEMPOTENCY_TABLE)?;
        match table.get(key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Remove ledger entries created before `cutoff_ms`, returning the count
    ///
    /// Clients do not retry indefinitely, so entries past the retention
    /// window can never match a live retry.
    pub fn prune_idempotency(&self, cutoff_ms: i64) -> StoreResult<usize> {
        let write_txn = self.db.begin_write()?;
        let pruned = {
            let mut table = write_txn.open_table(IDEMPOTENCY_TABLE)?;
            let mut stale = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let stored: IdempotencyEntry = serde_json::from_slice(value.value())?;
                if stored.created_at < cutoff_ms {
                    stale.push(key.value().to_string());
                }
            }
            for key in &stale {
                table.remove(key.as_str())?;
            }
            stale.len()
        };
        write_txn.commit()?;
        Ok(pruned)
    }

    // ========== Atomic commit ==========

    /// Atomically commit one accepted mutation
    ///
    /// In a single write transaction:
    /// 1. re-check the idempotency key (a concurrent retry may have won)
    /// 2. compare the stored version against `expected_version`
    /// 3. write the new order state, the audit record (if any), and the
    ///    ledger entry
    ///
    /// Returns without writing anything on `Conflict`, `Duplicate`, or
    /// `Missing`. redb serializes write transactions, so the version
    /// comparison inside the transaction is a true compare-and-swap.
    pub fn commit_mutation(
        &self,
        expected_version: u64,
        new_order: &Order,
        record: Option<&ModificationRecord>,
        entry: &IdempotencyEntry,
    ) -> StoreResult<CommitOutcome> {
        let order_bytes = serde_json::to_vec(new_order)?;
        let record_bytes = record.map(serde_json::to_vec).transpose()?;
        let entry_bytes = serde_json::to_vec(entry)?;

        // Decided inside the transaction, acted on after the table handles
        // are dropped (commit/abort consume the transaction).
        enum Decision {
            Commit,
            Duplicate(IdempotencyEntry),
            Conflict(u64),
            Missing,
        }

        let write_txn = self.db.begin_write()?;
        let decision = {
            let mut ledger = write_txn.open_table(IDEMPOTENCY_TABLE)?;
            let existing = ledger
                .get(entry.key.as_str())?
                .map(|guard| guard.value().to_vec());

            if let Some(bytes) = existing {
                Decision::Duplicate(serde_json::from_slice(&bytes)?)
            } else {
                let mut orders = write_txn.open_table(ORDERS_TABLE)?;
                let current = orders
                    .get(new_order.id.as_str())?
                    .map(|guard| guard.value().to_vec());

                match current {
                    None => Decision::Missing,
                    Some(bytes) => {
                        let stored: Order = serde_json::from_slice(&bytes)?;
                        if stored.version != expected_version {
                            Decision::Conflict(stored.version)
                        } else {
                            orders.insert(new_order.id.as_str(), order_bytes.as_slice())?;
                            if let Some(bytes) = &record_bytes {
                                let mut table = write_txn.open_table(MODIFICATIONS_TABLE)?;
                                table.insert(
                                    (new_order.id.as_str(), new_order.version),
                                    bytes.as_slice(),
                                )?;
                            }
                            ledger.insert(entry.key.as_str(), entry_bytes.as_slice())?;
                            Decision::Commit
                        }
                    }
                }
            }
        };

        match decision {
            Decision::Commit => {
                write_txn.commit()?;
                Ok(CommitOutcome::Committed)
            }
            Decision::Duplicate(stored) => {
                write_txn.abort()?;
                Ok(CommitOutcome::Duplicate(stored))
            }
            Decision::Conflict(actual) => {
                write_txn.abort()?;
                Ok(CommitOutcome::Conflict { actual })
            }
            Decision::Missing => {
                write_txn.abort()?;
                Ok(CommitOutcome::Missing)
            }
        }
    }
}
