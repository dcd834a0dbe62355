//! Fakes shared by the handler and service tests

use async_trait::async_trait;
use ferry_client::{ClientError, DeliveryQueue, JobRunner};
use ferry_store::{
    BatchRecords, DEFAULT_RECORDS_TTL, DEFAULT_RESULTS_TTL, MemoryRecordStore, ResultReporter,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::scheduler::{JobDispatcher, PollerConfig};
use crate::state::AppState;

/// Queue that keeps every sent `(body, group_id)` pair
#[derive(Default)]
pub struct RecordingQueue {
    sent: Mutex<Vec<(String, String)>>,
    unavailable: bool,
}

impl RecordingQueue {
    /// Queue whose sends all fail with a 503
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryQueue for RecordingQueue {
    async fn send(&self, body: &str, group_id: &str) -> ferry_client::Result<String> {
        if self.unavailable {
            return Err(ClientError::api_error(503, "Service Unavailable"));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push((body.to_string(), group_id.to_string()));
        Ok(format!("msg-{}", sent.len()))
    }
}

/// State over an in-memory store with a 300 s batch budget
pub fn app_state(
    store: &MemoryRecordStore,
    runner: Arc<dyn JobRunner>,
    queue: Arc<dyn DeliveryQueue>,
) -> AppState {
    AppState {
        records: BatchRecords::new(Arc::new(store.clone()), DEFAULT_RECORDS_TTL),
        results: ResultReporter::new(Arc::new(store.clone()), DEFAULT_RESULTS_TTL),
        dispatcher: Arc::new(JobDispatcher::new(
            runner,
            "replicate-images",
            PollerConfig::default(),
        )),
        queue,
        batch_timeout: Duration::from_secs(300),
    }
}
