//! Image-change events and their classification
//!
//! Events arrive from the source registry's event bus. Only pushes and
//! deletes are replicated; everything else is dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::domain::directive::Action;

/// An image-change event as emitted by the source registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageChangeEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "detail-type", default)]
    pub detail_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub detail: ImageDetail,
}

/// Payload of an image-change event
///
/// Fields Ferry does not use are kept in `extra` so the queued body is the
/// detail exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDetail {
    #[serde(rename = "repository-name")]
    pub repository_name: String,
    #[serde(rename = "image-digest")]
    pub image_digest: String,
    #[serde(rename = "image-tag", default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
    #[serde(rename = "action-type")]
    pub action_type: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// A classified event ready to be put on the ordered delivery channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub action: Action,
    /// Events sharing a key are delivered in order relative to each other
    pub group_key: String,
    /// JSON-encoded [`ImageDetail`]
    pub body: String,
}

/// Grouping key for an image reference: `repository` or `repository:tag`
pub fn group_key(repository: &str, tag: Option<&str>) -> String {
    match tag.filter(|t| !t.is_empty()) {
        Some(tag) => format!("{}:{}", repository, tag),
        None => repository.to_string(),
    }
}

/// Decides whether an event is replicated and builds its envelope
///
/// Returns `None` for action kinds other than PUSH and DELETE.
pub fn classify(event: &ImageChangeEvent) -> Result<Option<Envelope>, serde_json::Error> {
    let detail = &event.detail;

    let action = match detail.action_type.parse::<Action>() {
        Ok(action) => action,
        Err(_) => {
            debug!(
                "Skipping {} event for {}@{}",
                detail.action_type, detail.repository_name, detail.image_digest
            );
            return Ok(None);
        }
    };

    Ok(Some(Envelope {
        action,
        group_key: group_key(&detail.repository_name, detail.image_tag.as_deref()),
        body: serde_json::to_string(detail)?,
    }))
}
