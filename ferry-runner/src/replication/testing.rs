//! Fakes for replication tests

use async_trait::async_trait;
use ferry_client::{BasicCredentials, ClientError, ImageReference, RegistryApi};
use ferry_core::domain::batch::{MessageBody, StoredMessage};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::podman::{self, ContainerEngine, EngineError};
use crate::registry::RegistryLogin;

pub fn message(
    id: &str,
    action: &str,
    repository: &str,
    digest: &str,
    tag: Option<&str>,
) -> StoredMessage {
    let mut detail = json!({
        "repository-name": repository,
        "image-digest": digest,
        "action-type": action,
    });
    if let Some(tag) = tag {
        detail["image-tag"] = json!(tag);
    }

    StoredMessage {
        message_id: id.to_string(),
        receipt_handle: format!("receipt-{}", id),
        body: MessageBody::Json(detail),
    }
}

/// Container engine that records every call
#[derive(Default)]
pub struct FakeEngine {
    pulls: Mutex<Vec<String>>,
    pushes: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    logins: Mutex<Vec<(String, String)>>,
}

impl FakeEngine {
    pub fn fail_pulls_of(&self, digest: &str) {
        self.failing.lock().unwrap().insert(digest.to_string());
    }

    pub fn pulls(&self) -> Vec<String> {
        self.pulls.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn logins(&self) -> Vec<(String, String)> {
        self.logins.lock().unwrap().clone()
    }
}

impl ContainerEngine for FakeEngine {
    fn pull(&self, image: &str) -> podman::Result<String> {
        let failing = self.failing.lock().unwrap();
        if failing.iter().any(|digest| image.ends_with(digest.as_str())) {
            return Err(EngineError::Failed {
                command: "pull".to_string(),
                code: 125,
                stderr: "manifest unknown".to_string(),
            });
        }

        let mut pulls = self.pulls.lock().unwrap();
        pulls.push(image.to_string());
        Ok(format!("image-{}", pulls.len()))
    }

    fn tag(&self, _image_id: &str, _target: &str) -> podman::Result<()> {
        Ok(())
    }

    fn push(&self, target: &str) -> podman::Result<()> {
        self.pushes.lock().unwrap().push(target.to_string());
        Ok(())
    }

    fn remove(&self, image_id: &str) -> podman::Result<()> {
        self.removed.lock().unwrap().push(image_id.to_string());
        Ok(())
    }
}

impl RegistryLogin for FakeEngine {
    fn login(&self, host: &str, credentials: &BasicCredentials) -> podman::Result<()> {
        self.logins
            .lock()
            .unwrap()
            .push((host.to_string(), credentials.username.clone()));
        Ok(())
    }
}

/// Registry API that records deletes
#[derive(Default)]
pub struct FakeRegistry {
    deletes: Mutex<Vec<(String, ImageReference)>>,
    failing: Mutex<bool>,
}

impl FakeRegistry {
    pub fn fail_deletes(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn deletes(&self) -> Vec<(String, ImageReference)> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryApi for FakeRegistry {
    async fn delete_image(
        &self,
        repository: &str,
        reference: &ImageReference,
    ) -> ferry_client::Result<()> {
        if *self.failing.lock().unwrap() {
            return Err(ClientError::api_error(500, "Internal Server Error"));
        }
        self.deletes
            .lock()
            .unwrap()
            .push((repository.to_string(), reference.clone()));
        Ok(())
    }
}
