//! Order API module
//!
//! All mutations go through the engine's optimistic-concurrency contract;
//! handlers only translate between HTTP and [`MutationCommand`]s.
//!
//! | Path | Method | Purpose |
//! |------|--------|---------|
//! | /api/orders | POST | Create an order from a draft |
//! | /api/orders | GET | List active orders |
//! | /api/orders/{id} | GET | Fetch one order |
//! | /api/orders/{id}/modifications | GET | Audit trail |
//! | /api/orders/{id}/modify | POST | Remove items / change quantities |
//! | /api/orders/{id}/cancel | POST | Cancel the order |
//! | /api/orders/{id}/status | POST | Lifecycle transition |
//! | /api/orders/{id}/payment | POST | Mark paid/unpaid |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list_active))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/modifications", get(handler::list_modifications))
        .route("/{id}/modify", post(handler::modify))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/status", post(handler::change_status))
        .route("/{id}/payment", post(handler::update_payment))
}
