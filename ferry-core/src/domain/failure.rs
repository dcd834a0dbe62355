//! Failure sets
//!
//! The messages of a batch that could not be replicated. Only these are
//! redelivered; every other message in the batch is acknowledged.

use serde::{Deserialize, Serialize};

/// One failed message and why it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub message_id: String,
    pub cause: String,
}

/// Failed messages of one batch, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSet {
    failures: Vec<ItemFailure>,
}

impl FailureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure; a message already recorded keeps its first cause
    pub fn record(&mut self, message_id: impl Into<String>, cause: impl Into<String>) {
        let message_id = message_id.into();
        if self.contains(&message_id) {
            return;
        }
        self.failures.push(ItemFailure {
            message_id,
            cause: cause.into(),
        });
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.failures.iter().any(|f| f.message_id == message_id)
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemFailure> {
        self.failures.iter()
    }

    pub fn message_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.message_id.as_str()).collect()
    }

    /// Partial-batch-failure response for the delivery channel
    pub fn to_batch_response(&self) -> BatchResponse {
        BatchResponse {
            batch_item_failures: self
                .failures
                .iter()
                .map(|f| BatchItemFailure {
                    item_identifier: f.message_id.clone(),
                })
                .collect(),
        }
    }
}

/// Delivery channel's partial-batch-failure response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}
