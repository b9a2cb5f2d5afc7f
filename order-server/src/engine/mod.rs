//! Order lifecycle engine
//!
//! The concurrent-modification core: staff change an already-placed order
//! while it advances through the kitchen pipeline and while network retries
//! resend mutations. The engine guarantees no silently-lost concurrent
//! edits, no duplicate application of a retried mutation, financially
//! consistent totals, and a durable audit trail.
//!
//! - **state_machine**: validates status transitions
//! - **modify**: pure item-change application and total recomputation
//! - **cancel**: cancellation preconditions and advisory refund
//! - **money**: Decimal arithmetic and boundary rounding
//! - **store**: redb persistence with a true compare-and-swap commit
//! - **manager**: the concurrency controller tying it all together
//!
//! # Data Flow
//!
//! ```text
//! MutationCommand → OrderManager → pure op → CAS commit (redb)
//!                        │                        │
//!                    Broadcast ◄──────────── Audit record
//! ```

pub mod cancel;
pub mod error;
pub mod manager;
pub mod modify;
pub mod money;
pub mod state_machine;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use error::{EngineError, EngineResult};
pub use manager::{MutationCommand, MutationOutcome, MutationPayload, OrderManager};
pub use store::{OrderStore, StoreError};
