//! Shared application state

use ferry_client::DeliveryQueue;
use ferry_store::{BatchRecords, ResultReporter};
use std::sync::Arc;
use std::time::Duration;

use crate::scheduler::JobDispatcher;

/// Collaborators of the HTTP handlers, built once in `main`
#[derive(Clone)]
pub struct AppState {
    pub records: BatchRecords,
    pub results: ResultReporter,
    pub dispatcher: Arc<JobDispatcher>,
    pub queue: Arc<dyn DeliveryQueue>,
    /// Budget of one batch invocation
    pub batch_timeout: Duration,
}
