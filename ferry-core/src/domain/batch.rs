//! Batch domain types
//!
//! A batch is one group of messages delivered together by the ordered
//! delivery channel. It is captured under a [`BatchHandle`] before the
//! replication job is dispatched.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Correlates one captured batch with its eventual result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchHandle(Uuid);

impl BatchHandle {
    /// Generates a fresh handle
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for BatchHandle {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for BatchHandle {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for BatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A message as delivered by the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
}

/// Body of a stored message
///
/// Bodies are decoded at capture time. A body that is not valid JSON is
/// kept verbatim so the failure surfaces when the directive is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageBody {
    Json(JsonValue),
    Raw(String),
}

impl MessageBody {
    /// Decodes a raw body, falling back to [`MessageBody::Raw`]
    pub fn decode(raw: &str) -> Result<Self, (Self, serde_json::Error)> {
        serde_json::from_str(raw)
            .map(MessageBody::Json)
            .map_err(|e| (MessageBody::Raw(raw.to_string()), e))
    }
}

/// A message as persisted in the batch record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: MessageBody,
}
