//! Delivery queue client
//!
//! Sends classified events to the ordered, at-least-once delivery channel.

use async_trait::async_trait;
use ferry_core::dto::queue::{SendMessage, SentMessage};
use reqwest::Client;

use crate::error::Result;
use crate::{handle_response, normalize_base_url};

/// Send side of the ordered delivery channel
#[async_trait]
pub trait DeliveryQueue: Send + Sync {
    /// Enqueues `body`; messages sharing `group_id` are delivered in order
    ///
    /// # Returns
    /// The channel's identifier for the new message
    async fn send(&self, body: &str, group_id: &str) -> Result<String>;
}

/// HTTP implementation of [`DeliveryQueue`]
#[derive(Debug, Clone)]
pub struct HttpDeliveryQueue {
    queue_url: String,
    client: Client,
}

impl HttpDeliveryQueue {
    /// Create a new queue client
    ///
    /// # Arguments
    /// * `queue_url` - URL of the queue (e.g., "http://localhost:9324/queues/images")
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: normalize_base_url(queue_url),
            client: Client::new(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl DeliveryQueue for HttpDeliveryQueue {
    async fn send(&self, body: &str, group_id: &str) -> Result<String> {
        let url = format!("{}/messages", self.queue_url);
        let response = self
            .client
            .post(&url)
            .json(&SendMessage {
                body: body.to_string(),
                group_id: group_id.to_string(),
            })
            .send()
            .await?;

        let sent: SentMessage = handle_response(response).await?;
        Ok(sent.message_id)
    }
}
