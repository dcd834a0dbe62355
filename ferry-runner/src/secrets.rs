//! Secret access
//!
//! Secrets are mounted as files, one per secret, under a secrets directory.

use ferry_client::BasicCredentials;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("unable to read secret {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("secret {name} is not valid JSON: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("secret {name} has no {field}")]
    MissingField { name: String, field: &'static str },
}

/// Reads secrets from files in a directory
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads a secret; names may contain `/` to address subdirectories
    pub fn read(&self, name: &str) -> Result<String, SecretError> {
        let path = self.dir.join(Path::new(name.trim_start_matches('/')));
        debug!("Reading secret {} from {}", name, path.display());

        std::fs::read_to_string(&path).map_err(|source| SecretError::Read {
            name: name.to_string(),
            source,
        })
    }
}

/// Credentials for the destination registry
#[derive(Clone, PartialEq, Eq)]
pub struct DestinationCredentials {
    pub access_key: String,
    pub secret_access_key: String,
    pub region: Option<String>,
}

#[derive(Deserialize)]
struct SecretDocument {
    accesskey: Option<String>,
    secretaccesskey: Option<String>,
    region: Option<String>,
}

impl DestinationCredentials {
    /// Loads and checks the destination credentials secret
    pub fn load(store: &FileSecretStore, name: &str) -> Result<Self, SecretError> {
        Self::parse(name, &store.read(name)?)
    }

    fn parse(name: &str, raw: &str) -> Result<Self, SecretError> {
        let doc: SecretDocument =
            serde_json::from_str(raw).map_err(|source| SecretError::Malformed {
                name: name.to_string(),
                source,
            })?;

        let required = |value: Option<String>, field: &'static str| {
            value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SecretError::MissingField {
                    name: name.to_string(),
                    field,
                })
        };

        Ok(Self {
            access_key: required(doc.accesskey, "accesskey")?,
            secret_access_key: required(doc.secretaccesskey, "secretaccesskey")?,
            region: doc.region.filter(|r| !r.is_empty()),
        })
    }

    /// Registry login for these credentials
    pub fn basic(&self) -> BasicCredentials {
        BasicCredentials {
            username: self.access_key.clone(),
            password: self.secret_access_key.clone(),
        }
    }
}

impl std::fmt::Debug for DestinationCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationCredentials")
            .field("access_key", &self.access_key)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}
