//! Registry API client
//!
//! Deletes images from a registry through the OCI distribution API. Pushes
//! go through the container engine instead; see the runner.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use tracing::{debug, info};

use crate::error::Result;
use crate::{handle_empty_response, normalize_base_url};

const MANIFEST_ACCEPT: &str = "application/vnd.oci.image.index.v1+json, \
    application/vnd.oci.image.manifest.v1+json, \
    application/vnd.docker.distribution.manifest.list.v2+json, \
    application/vnd.docker.distribution.manifest.v2+json";

/// Identifies an image within a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Tag(String),
    Digest(String),
}

impl ImageReference {
    pub fn as_str(&self) -> &str {
        match self {
            ImageReference::Tag(tag) => tag,
            ImageReference::Digest(digest) => digest,
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageReference::Tag(tag) => write!(f, ":{}", tag),
            ImageReference::Digest(digest) => write!(f, "@{}", digest),
        }
    }
}

/// Username and password for registry basic auth
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registry operations the replication engine needs besides push
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Deletes a tag, or the whole manifest when given a digest
    ///
    /// Deleting an image that is already gone succeeds.
    async fn delete_image(&self, repository: &str, reference: &ImageReference) -> Result<()>;
}

/// OCI distribution API implementation of [`RegistryApi`]
#[derive(Debug, Clone)]
pub struct OciRegistryClient {
    base_url: String,
    client: Client,
    credentials: Option<BasicCredentials>,
}

impl OciRegistryClient {
    /// Create a client for a registry host
    ///
    /// # Arguments
    /// * `registry` - Registry host (e.g., "123456789012.dkr.ecr.us-east-1.amazonaws.com")
    ///   or a full URL; bare hosts are reached over https
    /// * `credentials` - Basic auth credentials, if the registry requires them
    pub fn new(registry: &str, credentials: Option<BasicCredentials>) -> Self {
        let base_url = if registry.starts_with("http://") || registry.starts_with("https://") {
            normalize_base_url(registry)
        } else {
            normalize_base_url(format!("https://{}", registry))
        };

        Self {
            base_url,
            client: Client::new(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn manifest_url(&self, repository: &str, reference: &ImageReference) -> String {
        format!(
            "{}/v2/{}/manifests/{}",
            self.base_url,
            repository,
            reference.as_str()
        )
    }
}

#[async_trait]
impl RegistryApi for OciRegistryClient {
    async fn delete_image(&self, repository: &str, reference: &ImageReference) -> Result<()> {
        let url = self.manifest_url(repository, reference);
        debug!("DELETE {}", url);

        let mut request = self.client.delete(&url).header("Accept", MANIFEST_ACCEPT);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }
        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            info!("Image {}{} already absent", repository, reference);
            return Ok(());
        }

        handle_empty_response(response).await
    }
}
