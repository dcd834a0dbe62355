//! Service Module
//!
//! The batch record store and the result reporter. Both read records
//! exactly once through [`take`]. Expired leftovers are removed by
//! [`purge_periodically`].

mod batches;
mod results;

pub use batches::{BatchRecords, DEFAULT_RECORDS_TTL};
pub use results::{DEFAULT_RESULTS_TTL, ResultReporter};

use chrono::{DateTime, TimeDelta, Utc};
use ferry_core::domain::batch::BatchHandle;
use ferry_core::dto::record::{Record, RecordKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::repository::RecordStore;

/// Default period between purges of expired records
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Purges expired records every `period`, starting immediately
///
/// Runs until the task is dropped. Failed purges are logged and retried on
/// the next tick.
pub async fn purge_periodically(store: Arc<dyn RecordStore>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match store.purge_expired().await {
            Ok(0) => debug!("No expired records to purge"),
            Ok(purged) => info!("Purged {} expired records", purged),
            Err(e) => warn!("Unable to purge expired records: {}", e),
        }
    }
}

/// Reads a record and deletes it whatever the read returned
///
/// A failed delete is logged and swallowed; the purge removes the record
/// once it expires.
pub(crate) async fn take(
    store: &dyn RecordStore,
    handle: BatchHandle,
    kind: RecordKind,
) -> Result<Option<Record>> {
    let fetched = store.get(handle, kind).await;

    debug!("[{}] Deleting {} item", handle, kind);
    if let Err(e) = store.delete(handle, kind).await {
        warn!("[{}] Unable to delete {}: {}", handle, kind, e);
    }

    fetched
}

pub(crate) fn expiry_after(ttl: Duration) -> DateTime<Utc> {
    let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
