//! Event API Handlers
//!
//! Entry point for image-change events from the source registry.

use axum::{Json, extract::State, http::StatusCode};
use ferry_core::domain::event::ImageChangeEvent;
use ferry_core::dto::queue::IngressOutcome;

use crate::api::error::{ApiError, ApiResult};
use crate::service::ingress_service;
use crate::state::AppState;

/// POST /events
/// Classify an event and enqueue it when it is replicated
pub async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<ImageChangeEvent>,
) -> ApiResult<(StatusCode, Json<IngressOutcome>)> {
    if event.detail.repository_name.is_empty() || event.detail.image_digest.is_empty() {
        return Err(ApiError::BadRequest(
            "event detail needs a repository name and an image digest".to_string(),
        ));
    }

    let outcome = ingress_service::ingest(state.queue.as_ref(), &event).await?;

    let status = match outcome {
        IngressOutcome::Queued { .. } => StatusCode::OK,
        IngressOutcome::Skipped { .. } => StatusCode::ACCEPTED,
    };
    Ok((status, Json(outcome)))
}
