//! Result reporter
//!
//! The replication job records which messages failed; the orchestrator
//! consumes that record to answer the delivery channel.

use ferry_core::domain::batch::BatchHandle;
use ferry_core::domain::failure::FailureSet;
use ferry_core::dto::record::{Record, RecordKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;
use crate::repository::RecordStore;
use crate::service::{expiry_after, take};

/// Default lifetime of a result record; the orchestrator reads it right
/// after the job completes
pub const DEFAULT_RESULTS_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct ResultReporter {
    store: Arc<dyn RecordStore>,
    ttl: Duration,
}

impl ResultReporter {
    pub fn new(store: Arc<dyn RecordStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Records the failure set of a batch
    ///
    /// A second report for the same handle fails with
    /// `StoreError::AlreadyExists`; it is never silently overwritten.
    pub async fn report(&self, handle: BatchHandle, failures: &FailureSet) -> Result<()> {
        debug!("[{}] Storing {} failure results", handle, failures.len());

        self.store
            .put_if_absent(Record {
                handle,
                kind: RecordKind::Results,
                payload: serde_json::to_value(failures)?,
                expires_at: expiry_after(self.ttl),
            })
            .await
    }

    /// Reads and deletes the failure set of a batch
    ///
    /// No result means nothing failed; treating it otherwise would loop
    /// redelivery on a handle that was already cleaned up.
    pub async fn consume(&self, handle: BatchHandle) -> Result<FailureSet> {
        match take(self.store.as_ref(), handle, RecordKind::Results).await? {
            Some(record) => Ok(serde_json::from_value(record.payload)?),
            None => {
                warn!("[{}] No results found", handle);
                Ok(FailureSet::new())
            }
        }
    }
}
