//! HTTP API
//!
//! Routes and tower-http middleware. Authentication and permission checks
//! are collaborator concerns handled upstream; this surface assumes the
//! caller is already authorized for the restaurant it mutates.

use axum::Router;
use http::HeaderValue;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub mod health;
pub mod orders;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Order lifecycle API
        .merge(orders::router())
        // Health API - public route
        .merge(health::router())
}

/// Build the fully configured application with all middleware
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - the dashboard runs on another origin
        .layer(CorsLayer::permissive())
        // Gzip compress responses
        .layer(CompressionLayer::new())
        // Request logging
        .layer(TraceLayer::new_for_http())
        // Request IDs for tracing retries across the wire
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(XRequestId))
}
