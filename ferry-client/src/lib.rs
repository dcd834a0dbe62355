//! Ferry HTTP Clients
//!
//! Type-safe HTTP clients for the external collaborators of the replication
//! pipeline:
//! - Job runner: starts replication jobs and reports their phase and status
//! - Delivery queue: the ordered, at-least-once channel events travel on
//! - Registry: OCI distribution API of the destination registry
//!
//! Each collaborator is a trait so the orchestrator and runner can be tested
//! against in-memory fakes.

pub mod error;
mod jobs;
mod queue;
mod registry;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use jobs::{HttpJobRunner, JobRunner, RunnerKind};
pub use queue::{DeliveryQueue, HttpDeliveryQueue};
pub use registry::{BasicCredentials, ImageReference, OciRegistryClient, RegistryApi};

use serde::de::DeserializeOwned;

/// Strips trailing slashes so paths can be appended with `format!`
pub(crate) fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

// =============================================================================
// Response Handlers
// =============================================================================

/// Handle an API response and deserialize JSON
///
/// This checks the status code and returns an appropriate error if the
/// request failed, or deserializes the response body if successful.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Handle an API response that returns no content (e.g., DELETE operations)
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(())
}
