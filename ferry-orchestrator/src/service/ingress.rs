//! Ingress Service
//!
//! Classifies image-change events and forwards the replicable ones to the
//! ordered delivery channel.

use ferry_client::DeliveryQueue;
use ferry_core::domain::event::{ImageChangeEvent, classify};
use ferry_core::dto::queue::IngressOutcome;

use crate::error::Result;

/// Classify one event and enqueue it under its grouping key
pub async fn ingest(queue: &dyn DeliveryQueue, event: &ImageChangeEvent) -> Result<IngressOutcome> {
    let Some(envelope) = classify(event)? else {
        return Ok(IngressOutcome::Skipped {
            action_type: event.detail.action_type.clone(),
        });
    };

    let message_id = queue.send(&envelope.body, &envelope.group_key).await?;

    tracing::info!(
        "Queued {} of {} as {} (group {})",
        envelope.action,
        event.detail.repository_name,
        message_id,
        envelope.group_key
    );

    Ok(IngressOutcome::Queued {
        message_id,
        group_key: envelope.group_key,
    })
}
