//! Replication directives
//!
//! A directive is one unit of replication work decoded from a queued
//! image-change event.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::batch::MessageBody;
use crate::domain::event::ImageDetail;

/// A message that cannot be turned into replication work
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message body is not valid JSON")]
    UndecodableBody,

    #[error("malformed image detail: {0}")]
    Malformed(String),

    #[error("unsupported action type: {0}")]
    UnknownAction(String),

    #[error("image tag is required to push {repository}@{digest}")]
    MissingTag { repository: String, digest: String },
}

/// What to do with the image in the destination registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Push,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Push => "PUSH",
            Action::Delete => "DELETE",
        }
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUSH" => Ok(Action::Push),
            "DELETE" => Ok(Action::Delete),
            other => Err(ValidationError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One push or delete to apply to the destination registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationDirective {
    pub repository: String,
    pub image_digest: String,
    /// A delete without a tag removes the whole digest
    pub image_tag: Option<String>,
    pub action: Action,
}

impl ReplicationDirective {
    /// Decodes a stored message body into a directive
    pub fn from_body(body: &MessageBody) -> Result<Self, ValidationError> {
        match body {
            MessageBody::Raw(_) => Err(ValidationError::UndecodableBody),
            MessageBody::Json(value) => {
                let detail: ImageDetail = serde_json::from_value(value.clone())
                    .map_err(|e| ValidationError::Malformed(e.to_string()))?;
                Self::try_from(&detail)
            }
        }
    }

    /// The tag to push, which must be present and non-empty
    pub fn push_tag(&self) -> Result<&str, ValidationError> {
        match self.image_tag.as_deref() {
            Some(tag) if !tag.is_empty() => Ok(tag),
            _ => Err(ValidationError::MissingTag {
                repository: self.repository.clone(),
                digest: self.image_digest.clone(),
            }),
        }
    }
}

impl TryFrom<&ImageDetail> for ReplicationDirective {
    type Error = ValidationError;

    fn try_from(detail: &ImageDetail) -> Result<Self, Self::Error> {
        Ok(Self {
            repository: detail.repository_name.clone(),
            image_digest: detail.image_digest.clone(),
            image_tag: detail.image_tag.clone().filter(|tag| !tag.is_empty()),
            action: detail.action_type.parse()?,
        })
    }
}

impl fmt::Display for ReplicationDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.image_tag {
            Some(tag) => write!(
                f,
                "{} {}:{} ({})",
                self.action, self.repository, tag, self.image_digest
            ),
            None => write!(f, "{} {}@{}", self.action, self.repository, self.image_digest),
        }
    }
}
