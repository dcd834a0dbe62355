//! Batch API Handlers
//!
//! Entry point for batches handed over by the delivery channel.

use axum::{Json, extract::State};
use ferry_core::deadline::Deadline;
use ferry_core::domain::failure::BatchResponse;
use ferry_core::dto::queue::DeliveredBatch;

use crate::api::error::ApiResult;
use crate::service::batch_service;
use crate::state::AppState;

/// POST /batches
/// Replicate a delivered batch and report the messages that failed
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(batch): Json<DeliveredBatch>,
) -> ApiResult<Json<BatchResponse>> {
    let deadline = Deadline::after(state.batch_timeout);
    tracing::debug!("Received batch of {} messages", batch.records.len());

    let failures = batch_service::process_batch(&state, &batch.records, &deadline).await?;

    Ok(Json(failures.to_batch_response()))
}
