//! Registry endpoints
//!
//! Resolves the source and destination registry hosts and authenticates
//! against them.

use ferry_client::{BasicCredentials, OciRegistryClient, RegistryApi};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, RegistryConfig};
use crate::podman;
use crate::secrets::{DestinationCredentials, FileSecretStore};

/// Authenticates the local container engine against a registry
pub trait RegistryLogin {
    fn login(&self, host: &str, credentials: &BasicCredentials) -> podman::Result<()>;
}

/// Host name of an ECR-style private registry
pub fn ecr_host(registry_id: &str, region: &str) -> String {
    format!("{}.dkr.ecr.{}.amazonaws.com", registry_id, region)
}

/// Both ends of a replication, logged in and ready
pub struct Registries {
    /// Source registry host images are pulled from
    pub source: String,
    /// Destination registry host images are pushed to
    pub destination: String,
    /// Destination registry API, used for deletes
    pub destination_api: Arc<dyn RegistryApi>,
}

impl Registries {
    /// Logs in to the source and destination registries
    ///
    /// The source is logged in to only when credentials are configured; the
    /// destination always needs the credentials from its secret.
    ///
    /// The secret's access key and secret access key are sent as-is, as the
    /// basic-auth username and password. No token exchange happens, so the
    /// destination registry (or a proxy in front of it) must accept these
    /// credentials directly.
    pub fn connect(
        config: &Config,
        secrets: &FileSecretStore,
        login: &dyn RegistryLogin,
    ) -> anyhow::Result<Self> {
        let source = config.source.host()?;
        match &config.source_credentials {
            Some(credentials) => login.login(&source, credentials)?,
            None => info!("No credentials for source registry {}, using ambient login", source),
        }

        let credentials = DestinationCredentials::load(secrets, &config.destination_secret)?;
        let destination = destination_host(&config.destination, &credentials)?;
        let basic = credentials.basic();
        login.login(&destination, &basic)?;

        Ok(Self {
            destination_api: Arc::new(OciRegistryClient::new(&destination, Some(basic))),
            source,
            destination,
        })
    }
}

/// The configured region is authoritative; the secret's is only checked
fn destination_host(
    registry: &RegistryConfig,
    credentials: &DestinationCredentials,
) -> anyhow::Result<String> {
    if let (Some(secret_region), Some(region)) = (&credentials.region, &registry.region) {
        if secret_region != region {
            warn!(
                "Destination secret is for region {}, logging in to {}",
                secret_region, region
            );
        }
    }
    registry.host()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecr_host() {
        assert_eq!(
            ecr_host("123456789012", "us-gov-west-1"),
            "123456789012.dkr.ecr.us-gov-west-1.amazonaws.com"
        );
    }

    #[test]
    fn test_configured_region_is_used() {
        let registry = RegistryConfig {
            registry_id: Some("210987654321".to_string()),
            region: Some("us-east-1".to_string()),
            url: None,
        };
        let credentials = DestinationCredentials {
            access_key: "AKIA".to_string(),
            secret_access_key: "secret".to_string(),
            region: Some("us-gov-east-1".to_string()),
        };

        assert_eq!(
            destination_host(&registry, &credentials).unwrap(),
            "210987654321.dkr.ecr.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_explicit_url_wins() {
        let registry = RegistryConfig {
            registry_id: None,
            region: Some("us-east-1".to_string()),
            url: Some("registry.example.com".to_string()),
        };
        let credentials = DestinationCredentials {
            access_key: "user".to_string(),
            secret_access_key: "pass".to_string(),
            region: Some("us-gov-east-1".to_string()),
        };

        assert_eq!(
            destination_host(&registry, &credentials).unwrap(),
            "registry.example.com"
        );
    }
}
