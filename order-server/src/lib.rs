//! Order Server - restaurant order lifecycle engine
//!
//! # Architecture overview
//!
//! The server lets restaurant staff change already-placed orders while the
//! orders advance through the kitchen pipeline and while flaky networks
//! retry requests. Core guarantees: no silently-lost concurrent edits, no
//! duplicate application of retried mutations, financially consistent
//! totals, and a durable audit trail.
//!
//! # Module structure
//!
//! ```text
//! order-server/src/
//! ├── core/          # config, state, server lifecycle, background tasks
//! ├── engine/        # state machine, modification, cancellation, CAS store
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, validation, handler errors
//! ```

pub mod api;
pub mod core;
pub mod engine;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use engine::{MutationCommand, MutationOutcome, MutationPayload, OrderManager, OrderStore};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Set up the process environment (dotenv, logging)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(())
}

/// Print the startup banner
pub fn print_banner() {
    println!("==============================================");
    println!("  order-server v{}", env!("CARGO_PKG_VERSION"));
    println!("  restaurant order lifecycle engine");
    println!("==============================================");
}
