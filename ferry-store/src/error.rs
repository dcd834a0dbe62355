//! Error types for the record store

use ferry_core::domain::batch::BatchHandle;
use ferry_core::dto::record::RecordKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A create-if-absent write found a live record
    #[error("{kind} record already exists for batch {handle}")]
    AlreadyExists { handle: BatchHandle, kind: RecordKind },

    #[error("failed to encode or decode record payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}
