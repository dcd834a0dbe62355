//! Delivery queue DTOs

use serde::{Deserialize, Serialize};

use crate::domain::batch::QueueMessage;

/// Message sent to the ordered delivery channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub body: String,
    pub group_id: String,
}

/// Acknowledgement of a sent message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub message_id: String,
}

/// A batch of messages handed over by the delivery channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveredBatch {
    #[serde(rename = "Records")]
    pub records: Vec<QueueMessage>,
}

/// Outcome of classifying one inbound event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngressOutcome {
    Queued { message_id: String, group_key: String },
    Skipped { action_type: String },
}
