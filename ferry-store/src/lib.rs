//! Ferry Store
//!
//! Durable hand-off between the orchestrator and the replication job.
//!
//! Architecture:
//! - Repository: the `RecordStore` key-value seam with Postgres and
//!   in-memory backends
//! - Services: the batch record store (capture/retrieve) and the result
//!   reporter (report/consume) built on top of it
//!
//! Every record is read at most once: retrieval deletes the record on every
//! exit path, and a periodic purge removes what a crashed consumer leaves
//! behind once it expires.

pub mod db;
pub mod error;
pub mod repository;
pub mod service;

pub use error::{Result, StoreError};
pub use repository::{MemoryRecordStore, PgRecordStore, RecordStore};
pub use service::{
    BatchRecords, DEFAULT_PURGE_INTERVAL, DEFAULT_RECORDS_TTL, DEFAULT_RESULTS_TTL,
    ResultReporter, purge_periodically,
};
