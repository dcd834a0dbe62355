//! Batch Service
//!
//! Handles one delivered batch: capture it, run the replication job over it
//! and answer with the messages that failed.

use ferry_core::deadline::Deadline;
use ferry_core::domain::batch::QueueMessage;
use ferry_core::domain::failure::FailureSet;

use crate::error::Result;
use crate::state::AppState;

/// Run the replication job over `messages` and collect its failures
///
/// Any error here fails the whole batch, so the delivery channel redelivers
/// every message. No partial result is ever returned.
pub async fn process_batch(
    state: &AppState,
    messages: &[QueueMessage],
    deadline: &Deadline,
) -> Result<FailureSet> {
    if messages.is_empty() {
        tracing::debug!("Empty batch, nothing to replicate");
        return Ok(FailureSet::new());
    }

    let handle = state.records.capture(messages).await?;
    tracing::info!("[{}] Captured {} messages", handle, messages.len());

    let job = state.dispatcher.dispatch(handle, deadline).await?;
    tracing::info!("[{}] Job {} is running ({})", handle, job.id, job.phase);

    let job = state.dispatcher.join(&job.id, deadline).await?;
    tracing::info!("[{}] Job {} completed", handle, job.id);

    let failures = state.results.consume(handle).await?;
    if !failures.is_empty() {
        tracing::warn!(
            "[{}] {} of {} messages failed: {:?}",
            handle,
            failures.len(),
            messages.len(),
            failures.message_ids()
        );
    }

    Ok(failures)
}
