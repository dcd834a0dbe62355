//! Batch record store
//!
//! Captures a delivered batch before the replication job is dispatched and
//! hands it to the job exactly once.

use ferry_core::domain::batch::{BatchHandle, MessageBody, QueueMessage, StoredMessage};
use ferry_core::dto::record::{Record, RecordKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;
use crate::repository::RecordStore;
use crate::service::{expiry_after, take};

/// Default lifetime of a captured batch; should match the channel's
/// visibility timeout
pub const DEFAULT_RECORDS_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub struct BatchRecords {
    store: Arc<dyn RecordStore>,
    ttl: Duration,
}

impl BatchRecords {
    pub fn new(store: Arc<dyn RecordStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Persists a batch under a fresh handle
    ///
    /// Bodies are decoded here. A body that is not JSON is kept as the raw
    /// string and fails later, when its directive is processed.
    pub async fn capture(&self, messages: &[QueueMessage]) -> Result<BatchHandle> {
        let handle = BatchHandle::generate();

        let stored: Vec<StoredMessage> = messages
            .iter()
            .map(|msg| {
                let body = match MessageBody::decode(&msg.body) {
                    Ok(body) => body,
                    Err((raw, e)) => {
                        warn!(
                            "[{}] Unable to decode record body of {}: {} ({})",
                            handle, msg.message_id, msg.body, e
                        );
                        raw
                    }
                };
                StoredMessage {
                    message_id: msg.message_id.clone(),
                    receipt_handle: msg.receipt_handle.clone(),
                    body,
                }
            })
            .collect();

        debug!("[{}] Storing {} records", handle, stored.len());

        self.store
            .put(Record {
                handle,
                kind: RecordKind::Records,
                payload: serde_json::to_value(&stored)?,
                expires_at: expiry_after(self.ttl),
            })
            .await?;

        Ok(handle)
    }

    /// Reads and deletes a captured batch
    ///
    /// An absent batch (already consumed or expired) yields an empty list:
    /// with at-least-once delivery a retry can legitimately find nothing.
    pub async fn retrieve(&self, handle: BatchHandle) -> Result<Vec<StoredMessage>> {
        match take(self.store.as_ref(), handle, RecordKind::Records).await? {
            Some(record) => Ok(serde_json::from_value(record.payload)?),
            None => {
                warn!("[{}] No records found", handle);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::repository::MemoryRecordStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn message(id: &str, body: &str) -> QueueMessage {
        QueueMessage {
            message_id: id.to_string(),
            receipt_handle: format!("receipt-{}", id),
            body: body.to_string(),
        }
    }

    fn records(store: &MemoryRecordStore) -> BatchRecords {
        BatchRecords::new(Arc::new(store.clone()), DEFAULT_RECORDS_TTL)
    }

    #[tokio::test]
    async fn test_capture_then_retrieve_once() {
        let store = MemoryRecordStore::new();
        let batches = records(&store);

        let handle = batches
            .capture(&[
                message("m-1", r#"{"action-type":"PUSH"}"#),
                message("m-2", r#"{"action-type":"DELETE"}"#),
            ])
            .await
            .unwrap();

        let first = batches.retrieve(handle).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].message_id, "m-1");
        assert_eq!(first[0].receipt_handle, "receipt-m-1");
        assert_eq!(first[0].body, MessageBody::Json(json!({"action-type": "PUSH"})));
        assert_eq!(first[1].message_id, "m-2");

        let second = batches.retrieve(handle).await.unwrap();
        assert!(second.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_kept_raw() {
        let store = MemoryRecordStore::new();
        let batches = records(&store);

        let handle = batches.capture(&[message("m-1", "not json")]).await.unwrap();
        let stored = batches.retrieve(handle).await.unwrap();

        assert_eq!(stored[0].body, MessageBody::Raw("not json".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_handle_is_empty() {
        let batches = records(&MemoryRecordStore::new());
        let stored = batches.retrieve(BatchHandle::generate()).await.unwrap();
        assert!(stored.is_empty());
    }

    /// Store whose reads always fail
    struct FailingReads {
        inner: MemoryRecordStore,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for FailingReads {
        async fn put(&self, record: Record) -> Result<()> {
            self.inner.put(record).await
        }

        async fn put_if_absent(&self, record: Record) -> Result<()> {
            self.inner.put_if_absent(record).await
        }

        async fn get(&self, _handle: BatchHandle, _kind: RecordKind) -> Result<Option<Record>> {
            Err(StoreError::Unavailable("read timed out".to_string()))
        }

        async fn delete(&self, handle: BatchHandle, kind: RecordKind) -> Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(handle, kind).await
        }

        async fn purge_expired(&self) -> Result<u64> {
            self.inner.purge_expired().await
        }
    }

    #[tokio::test]
    async fn test_retrieve_deletes_even_when_read_fails() {
        let inner = MemoryRecordStore::new();
        let store = Arc::new(FailingReads {
            inner: inner.clone(),
            deletes: AtomicUsize::new(0),
        });
        let batches = BatchRecords::new(store.clone(), DEFAULT_RECORDS_TTL);

        let handle = batches.capture(&[message("m-1", "{}")]).await.unwrap();
        assert!(batches.retrieve(handle).await.is_err());

        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
        assert!(inner.is_empty());
    }
}
