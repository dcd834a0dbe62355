//! Record store DTOs
//!
//! Batches and their results share one table, keyed by `(handle, kind)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::domain::batch::BatchHandle;

/// Logical kind of a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Captured batch of messages
    Records,
    /// Failure set reported by the job
    Results,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Records => "records",
            RecordKind::Results => "results",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record with its expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub handle: BatchHandle,
    pub kind: RecordKind,
    pub payload: JsonValue,
    pub expires_at: DateTime<Utc>,
}

impl Record {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
