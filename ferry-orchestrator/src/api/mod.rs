//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod batches;
pub mod error;
pub mod events;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Source registry events
        .route("/events", post(events::receive_event))
        // Delivery channel batches
        .route("/batches", post(batches::handle_batch))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
