//! Order API handlers
//!
//! Thin translation layer: pull the actor from the `x-actor-id` header
//! (identity is established upstream), build a [`MutationCommand`], run the
//! engine on the blocking pool, and wrap the outcome in the response
//! envelope. Conflict and validation failures arrive here as [`AppError`]
//! and render with the right HTTP status.

use axum::{
    Json,
    extract::{Path, State},
};
use http::HeaderMap;

use crate::core::ServerState;
use crate::engine::error::EngineResult;
use crate::engine::{MutationCommand, MutationOutcome, MutationPayload};
use crate::utils::validation::MAX_ACTOR_ID_LEN;
use crate::utils::{AppError, AppResult};
use shared::order::modification::ModificationRecord;
use shared::order::{Order, OrderDraft};
use shared::request::{
    CancelOrderRequest, ModifyOrderRequest, PaymentStatusRequest, TransitionRequest,
};
use shared::response::{ApiResponse, OperationResult};
use shared::ErrorKind;

/// Staff identity header, set by the authenticating proxy
const ACTOR_HEADER: &str = "x-actor-id";

/// Extract the acting staff member from request headers
fn actor_id(headers: &HeaderMap) -> AppResult<String> {
    let actor = headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    if actor.is_empty() || actor.len() > MAX_ACTOR_ID_LEN {
        return Err(AppError::validation(format!(
            "{ACTOR_HEADER} must be 1-{MAX_ACTOR_ID_LEN} chars"
        )));
    }
    Ok(actor.to_string())
}

/// Run a synchronous engine call on the blocking pool
async fn run_engine<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(AppError::from),
        Err(e) => {
            tracing::error!(error = %e, "engine task failed to run");
            Err(AppError::new(
                ErrorKind::PersistenceError,
                ErrorKind::PersistenceError.message(),
            ))
        }
    }
}

fn to_result(outcome: MutationOutcome) -> OperationResult {
    OperationResult::applied(outcome.order, outcome.modification, outcome.refund_owed)
}

// ========== Creation and reads ==========

/// Create an order from a draft
pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(draft): Json<OrderDraft>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let actor = actor_id(&headers)?;
    let manager = state.manager();
    let order = run_engine(move || manager.create_order(draft, &actor)).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// List all active (non-terminal) orders
pub async fn list_active(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let manager = state.manager();
    let orders = run_engine(move || manager.list_active()).await?;
    Ok(Json(ApiResponse::ok(orders)))
}

/// Fetch one order
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let manager = state.manager();
    let order = run_engine(move || manager.get_order(&id)).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// Audit trail for an order, oldest first
pub async fn list_modifications(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<ModificationRecord>>>> {
    let manager = state.manager();
    let records = run_engine(move || manager.modifications(&id)).await?;
    Ok(Json(ApiResponse::ok(records)))
}

// ========== Mutations ==========

/// Remove items / change quantities on a placed order
pub async fn modify(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ModifyOrderRequest>,
) -> AppResult<Json<ApiResponse<OperationResult>>> {
    let actor = actor_id(&headers)?;
    let cmd = MutationCommand {
        order_id: id,
        expected_version: req.expected_version,
        idempotency_key: req.idempotency_key,
        actor_id: actor,
        payload: MutationPayload::ModifyItems {
            changes: req.item_changes,
            reason: req.reason,
            reason_notes: req.reason_notes,
            customer_notified: req.customer_notified,
        },
    };
    let manager = state.manager();
    let outcome = run_engine(move || manager.execute(cmd)).await?;
    Ok(Json(ApiResponse::ok(to_result(outcome))))
}

/// Cancel an order
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CancelOrderRequest>,
) -> AppResult<Json<ApiResponse<OperationResult>>> {
    let actor = actor_id(&headers)?;
    let cmd = MutationCommand {
        order_id: id,
        expected_version: req.expected_version,
        idempotency_key: req.idempotency_key,
        actor_id: actor,
        payload: MutationPayload::Cancel {
            reason: req.reason,
            reason_notes: req.reason_notes,
            customer_notified: req.customer_notified,
        },
    };
    let manager = state.manager();
    let outcome = run_engine(move || manager.execute(cmd)).await?;
    Ok(Json(ApiResponse::ok(to_result(outcome))))
}

/// Advance (or cancel) the lifecycle status
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<TransitionRequest>,
) -> AppResult<Json<ApiResponse<OperationResult>>> {
    let actor = actor_id(&headers)?;
    let cmd = MutationCommand {
        order_id: id,
        expected_version: req.expected_version,
        idempotency_key: req.idempotency_key,
        actor_id: actor,
        payload: MutationPayload::ChangeStatus {
            target: req.target_status,
        },
    };
    let manager = state.manager();
    let outcome = run_engine(move || manager.execute(cmd)).await?;
    Ok(Json(ApiResponse::ok(to_result(outcome))))
}

/// Mark an order paid or unpaid
pub async fn update_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<PaymentStatusRequest>,
) -> AppResult<Json<ApiResponse<OperationResult>>> {
    let actor = actor_id(&headers)?;
    let cmd = MutationCommand {
        order_id: id,
        expected_version: req.expected_version,
        idempotency_key: req.idempotency_key,
        actor_id: actor,
        payload: MutationPayload::SetPaymentStatus {
            payment_status: req.payment_status,
        },
    };
    let manager = state.manager();
    let outcome = run_engine(move || manager.execute(cmd)).await?;
    Ok(Json(ApiResponse::ok(to_result(outcome))))
}
