//! Health Check API Handler
//!
//! Liveness endpoint for the load balancer.

use axum::{Json, http::StatusCode, response::IntoResponse};

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
        })),
    )
}
