//! Server state
//!
//! [`ServerState`] holds the shared handles every handler and background
//! task needs. It is cheap to clone (Arc inside) and is the axum state
//! type for the whole router.

use std::sync::Arc;

use crate::core::{Config, Result};
use crate::engine::OrderManager;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration (immutable after startup)
    pub config: Config,
    /// The order lifecycle engine
    engine: Arc<OrderManager>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("engine", &"<OrderManager>")
            .finish()
    }
}

impl ServerState {
    /// Initialize state: create the work directory and open the engine
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let engine = OrderManager::open(config.db_path())?;
        tracing::info!(db = %config.db_path().display(), "order engine opened");
        Ok(Self {
            config: config.clone(),
            engine: Arc::new(engine),
        })
    }

    /// In-memory state for tests
    pub fn in_memory(config: Config) -> Result<Self> {
        let engine = OrderManager::open_in_memory()?;
        Ok(Self {
            config,
            engine: Arc::new(engine),
        })
    }

    /// Handle to the order engine
    pub fn manager(&self) -> Arc<OrderManager> {
        self.engine.clone()
    }

    /// Spawn the background tasks (ledger GC, event logging)
    pub fn start_background_tasks(&self) {
        crate::core::tasks::start(self.clone());
    }
}
