//! Repository Module
//!
//! Key-value access to batch and result records.
//!
//! The trait is what the services depend on, so the orchestrator and the
//! runner can run against the in-memory backend in tests.

mod memory;
mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

use async_trait::async_trait;
use ferry_core::domain::batch::BatchHandle;
use ferry_core::dto::record::{Record, RecordKind};

use crate::error::Result;

/// Durable key-value store with per-record expiry
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Writes a record, replacing any existing one
    async fn put(&self, record: Record) -> Result<()>;

    /// Writes a record unless a live one exists
    ///
    /// Fails with `StoreError::AlreadyExists` on conflict.
    async fn put_if_absent(&self, record: Record) -> Result<()>;

    /// Reads a record
    ///
    /// Expired records stay readable until [`RecordStore::purge_expired`]
    /// removes them.
    async fn get(&self, handle: BatchHandle, kind: RecordKind) -> Result<Option<Record>>;

    /// Deletes a record; deleting an absent record succeeds
    async fn delete(&self, handle: BatchHandle, kind: RecordKind) -> Result<()>;

    /// Removes every expired record
    ///
    /// # Returns
    /// The number of records removed
    async fn purge_expired(&self) -> Result<u64>;
}
