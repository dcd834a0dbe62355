//! Replication Module
//!
//! Applies a batch of directives to the destination registry.

mod cache;
mod engine;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ImageCache;
pub use engine::ReplicationEngine;

use ferry_client::ClientError;
use ferry_core::domain::directive::ValidationError;
use thiserror::Error;

use crate::podman::EngineError;

/// Why a single directive failed; never fatal to the batch
#[derive(Debug, Error)]
pub enum ReplicationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("registry request failed: {0}")]
    Registry(#[from] ClientError),
}
