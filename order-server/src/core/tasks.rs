//! Background tasks
//!
//! Long-lived tokio tasks spawned at startup:
//! - idempotency ledger GC: prunes consumed keys past the retention window
//! - event logging: subscribes to the engine broadcast and records every
//!   committed mutation in the server log

use crate::core::ServerState;
use std::time::Duration;

/// Spawn all background tasks
pub fn start(state: ServerState) {
    spawn_idempotency_gc(state.clone());
    spawn_event_logger(state);
}

/// Periodically prune consumed idempotency keys
///
/// Clients do not retry past the retention window, so pruned keys can
/// never match a live retry.
fn spawn_idempotency_gc(state: ServerState) {
    let retention = state.config.idempotency_retention_hours;
    let interval = Duration::from_secs(state.config.idempotency_sweep_interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // the first tick fires immediately; skip it so startup stays quick
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let manager = state.manager();
            let result =
                tokio::task::spawn_blocking(move || manager.prune_idempotency(retention)).await;
            match result {
                Ok(Ok(0)) => {}
                Ok(Ok(pruned)) => {
                    tracing::info!(pruned, retention_hours = retention, "idempotency ledger GC");
                }
                Ok(Err(e)) => tracing::warn!(error = %e, "idempotency ledger GC failed"),
                Err(e) => tracing::error!(error = %e, "idempotency GC task panicked"),
            }
        }
    });
}

/// Log every committed mutation
fn spawn_event_logger(state: ServerState) {
    let mut rx = state.manager().subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        order_id = %event.order_id,
                        version = event.version,
                        event = %event.event_type,
                        actor = %event.actor_id,
                        "domain event"
                    );
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event logger lagged behind broadcast");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
