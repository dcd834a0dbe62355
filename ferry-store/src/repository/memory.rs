//! In-memory record repository
//!
//! Process-local backend for tests and single-process development setups.

use async_trait::async_trait;
use ferry_core::domain::batch::BatchHandle;
use ferry_core::dto::record::{Record, RecordKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, StoreError};
use crate::repository::RecordStore;

type Key = (BatchHandle, RecordKind);

/// In-memory implementation of [`RecordStore`]
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<Mutex<HashMap<Key, Record>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, expired ones included
    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a record exists for the key, expired or not
    pub fn contains(&self, handle: BatchHandle, kind: RecordKind) -> bool {
        self.lock()
            .map(|records| records.contains_key(&(handle, kind)))
            .unwrap_or(false)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Key, Record>>> {
        self.records
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Failed to lock record map: {}", e)))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(&self, record: Record) -> Result<()> {
        let mut records = self.lock()?;
        records.insert((record.handle, record.kind), record);
        Ok(())
    }

    async fn put_if_absent(&self, record: Record) -> Result<()> {
        let mut records = self.lock()?;
        let key = (record.handle, record.kind);
        let now = chrono::Utc::now();

        if records.get(&key).is_some_and(|existing| !existing.is_expired(now)) {
            return Err(StoreError::AlreadyExists {
                handle: record.handle,
                kind: record.kind,
            });
        }

        records.insert(key, record);
        Ok(())
    }

    async fn get(&self, handle: BatchHandle, kind: RecordKind) -> Result<Option<Record>> {
        let records = self.lock()?;
        Ok(records.get(&(handle, kind)).cloned())
    }

    async fn delete(&self, handle: BatchHandle, kind: RecordKind) -> Result<()> {
        let mut records = self.lock()?;
        records.remove(&(handle, kind));
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let mut records = self.lock()?;
        let now = chrono::Utc::now();
        let before = records.len();

        records.retain(|_, record| !record.is_expired(now));
        Ok((before - records.len()) as u64)
    }
}
