//! Replication engine
//!
//! Applies directives strictly in delivery order. A directive that fails is
//! recorded and the batch moves on; only the caller decides what a failed
//! message means.

use ferry_client::{ImageReference, RegistryApi};
use ferry_core::domain::batch::StoredMessage;
use ferry_core::domain::directive::{Action, ReplicationDirective};
use ferry_core::domain::failure::FailureSet;
use std::sync::Arc;
use tracing::{error, info};

use crate::podman::ContainerEngine;
use crate::replication::{ImageCache, ReplicationError};

pub struct ReplicationEngine {
    engine: Arc<dyn ContainerEngine>,
    registry: Arc<dyn RegistryApi>,
    /// Source registry host
    source: String,
    /// Destination registry host
    destination: String,
    cache: ImageCache,
}

impl ReplicationEngine {
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        registry: Arc<dyn RegistryApi>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            registry,
            source: source.into(),
            destination: destination.into(),
            cache: ImageCache::new(),
        }
    }

    /// Replicates every message and returns the ones that failed
    ///
    /// Pulled images are removed from the local engine before returning.
    pub async fn replicate(&mut self, messages: &[StoredMessage]) -> FailureSet {
        let mut failures = FailureSet::new();

        for message in messages {
            if let Err(e) = self.apply(message).await {
                error!("Error processing record {}: {}", message.message_id, e);
                failures.record(message.message_id.as_str(), e.to_string());
            }
        }

        info!(
            "Replicated {} of {} records, cleaning up {} images",
            messages.len() - failures.len(),
            messages.len(),
            self.cache.len()
        );
        self.cache.clear(self.engine.as_ref());

        failures
    }

    async fn apply(&mut self, message: &StoredMessage) -> Result<(), ReplicationError> {
        let directive = ReplicationDirective::from_body(&message.body)?;
        info!("[{}] {}", message.message_id, directive);

        match directive.action {
            Action::Push => self.push(&directive),
            Action::Delete => self.delete(&directive).await,
        }
    }

    fn push(&mut self, directive: &ReplicationDirective) -> Result<(), ReplicationError> {
        let tag = directive.push_tag()?;

        let image_id = self.cache.get_or_pull(
            self.engine.as_ref(),
            &self.source,
            &directive.repository,
            &directive.image_digest,
        )?;

        let target = format!("{}/{}:{}", self.destination, directive.repository, tag);
        self.engine.tag(image_id, &target)?;
        self.engine.push(&target)?;

        Ok(())
    }

    async fn delete(&self, directive: &ReplicationDirective) -> Result<(), ReplicationError> {
        let reference = match &directive.image_tag {
            Some(tag) => ImageReference::Tag(tag.clone()),
            None => ImageReference::Digest(directive.image_digest.clone()),
        };

        info!(
            "Deleting image {}/{}{}",
            self.destination, directive.repository, reference
        );
        self.registry
            .delete_image(&directive.repository, &reference)
            .await?;

        Ok(())
    }
}
