//! Service layer
//!
//! Runs one replication job: fetch the captured batch, replicate it, report
//! the failures back for the orchestrator.
//!
//! The service is trait-based so `main` only depends on the seam.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ferry_core::domain::batch::BatchHandle;
use ferry_core::domain::failure::FailureSet;
use ferry_store::{BatchRecords, ResultReporter};
use std::sync::Arc;
use tracing::{info, warn};

use crate::podman::ContainerEngine;
use crate::registry::Registries;
use crate::replication::ReplicationEngine;

#[async_trait]
pub trait ReplicationService: Send + Sync {
    /// Replicates the batch captured under `handle`
    ///
    /// # Returns
    /// The messages that failed, as reported to the orchestrator
    async fn run(&self, handle: BatchHandle) -> Result<FailureSet>;
}

pub struct StandardReplicationService {
    records: BatchRecords,
    results: ResultReporter,
    engine: Arc<dyn ContainerEngine>,
    registries: Registries,
}

impl StandardReplicationService {
    pub fn new(
        records: BatchRecords,
        results: ResultReporter,
        engine: Arc<dyn ContainerEngine>,
        registries: Registries,
    ) -> Self {
        Self {
            records,
            results,
            engine,
            registries,
        }
    }
}

#[async_trait]
impl ReplicationService for StandardReplicationService {
    async fn run(&self, handle: BatchHandle) -> Result<FailureSet> {
        let messages = self
            .records
            .retrieve(handle)
            .await
            .with_context(|| format!("Failed to retrieve records {}", handle))?;
        info!("[{}] Replicating {} records", handle, messages.len());

        let mut engine = ReplicationEngine::new(
            self.engine.clone(),
            self.registries.destination_api.clone(),
            self.registries.source.clone(),
            self.registries.destination.clone(),
        );
        let failures = engine.replicate(&messages).await;

        if !failures.is_empty() {
            warn!(
                "[{}] {} records failed: {:?}",
                handle,
                failures.len(),
                failures.message_ids()
            );
        }

        self.results
            .report(handle, &failures)
            .await
            .with_context(|| format!("Failed to store results {}", handle))?;

        Ok(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RegistryConfig};
    use crate::replication::testing::{FakeEngine, FakeRegistry};
    use crate::secrets::FileSecretStore;
    use ferry_client::ImageReference;
    use ferry_core::domain::batch::QueueMessage;
    use ferry_core::dto::record::RecordKind;
    use ferry_store::{DEFAULT_RECORDS_TTL, DEFAULT_RESULTS_TTL, MemoryRecordStore};
    use std::path::PathBuf;

    struct Harness {
        store: MemoryRecordStore,
        images: Arc<FakeEngine>,
        registry: Arc<FakeRegistry>,
        service: StandardReplicationService,
    }

    fn harness() -> Harness {
        let store = MemoryRecordStore::new();
        let images = Arc::new(FakeEngine::default());
        let registry = Arc::new(FakeRegistry::default());

        let service = StandardReplicationService::new(
            BatchRecords::new(Arc::new(store.clone()), DEFAULT_RECORDS_TTL),
            ResultReporter::new(Arc::new(store.clone()), DEFAULT_RESULTS_TTL),
            images.clone(),
            Registries {
                source: "src.example.com".to_string(),
                destination: "dst.example.com".to_string(),
                destination_api: registry.clone(),
            },
        );

        Harness {
            store,
            images,
            registry,
            service,
        }
    }

    fn queued(id: &str, body: &str) -> QueueMessage {
        QueueMessage {
            message_id: id.to_string(),
            receipt_handle: format!("receipt-{}", id),
            body: body.to_string(),
        }
    }

    async fn capture(harness: &Harness, messages: &[QueueMessage]) -> BatchHandle {
        BatchRecords::new(Arc::new(harness.store.clone()), DEFAULT_RECORDS_TTL)
            .capture(messages)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_batch_is_replicated_and_reported() {
        let h = harness();
        let handle = capture(
            &h,
            &[
                queued(
                    "m-1",
                    r#"{"repository-name":"team/app","image-digest":"sha256:d1","image-tag":"v1","action-type":"PUSH"}"#,
                ),
                queued(
                    "m-2",
                    r#"{"repository-name":"team/app","image-digest":"sha256:d1","image-tag":"v2","action-type":"PUSH"}"#,
                ),
                queued(
                    "m-3",
                    r#"{"repository-name":"team/app","image-digest":"sha256:d2","action-type":"DELETE"}"#,
                ),
            ],
        )
        .await;

        let failures = h.service.run(handle).await.unwrap();

        assert!(failures.is_empty());
        assert_eq!(h.images.pulls().len(), 1);
        assert_eq!(h.images.pushes().len(), 2);
        assert_eq!(
            h.registry.deletes()[0].1,
            ImageReference::Digest("sha256:d2".to_string())
        );
        assert!(!h.store.contains(handle, RecordKind::Records));
        assert!(h.store.contains(handle, RecordKind::Results));
    }

    #[tokio::test]
    async fn test_raw_body_is_reported_as_failed() {
        let h = harness();
        let handle = capture(
            &h,
            &[
                queued("m-1", "{not json"),
                queued(
                    "m-2",
                    r#"{"repository-name":"team/app","image-digest":"sha256:d1","image-tag":"v1","action-type":"PUSH"}"#,
                ),
            ],
        )
        .await;

        let failures = h.service.run(handle).await.unwrap();

        assert_eq!(failures.message_ids(), vec!["m-1"]);
        assert_eq!(h.images.pushes(), vec!["dst.example.com/team/app:v1"]);

        let reported = ResultReporter::new(Arc::new(h.store.clone()), DEFAULT_RESULTS_TTL)
            .consume(handle)
            .await
            .unwrap();
        assert_eq!(reported, failures);
    }

    #[tokio::test]
    async fn test_second_run_cannot_overwrite_results() {
        let h = harness();
        let handle = capture(&h, &[queued("m-1", "{not json")]).await;

        h.service.run(handle).await.unwrap();
        assert!(h.service.run(handle).await.is_err());
    }

    #[test]
    fn test_connect_logs_in_to_both_registries() {
        let dir = std::env::temp_dir().join(format!("ferry-connect-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("destination"),
            r#"{"accesskey":"AKIA","secretaccesskey":"x"}"#,
        )
        .unwrap();

        let config = Config {
            database_url: String::new(),
            source: RegistryConfig {
                registry_id: None,
                region: None,
                url: Some("src.example.com".to_string()),
            },
            source_credentials: Some(ferry_client::BasicCredentials {
                username: "reader".to_string(),
                password: "pw".to_string(),
            }),
            destination: RegistryConfig {
                registry_id: Some("210987654321".to_string()),
                region: Some("us-gov-west-1".to_string()),
                url: None,
            },
            destination_secret: "destination".to_string(),
            secrets_dir: PathBuf::from(&dir),
            results_ttl: DEFAULT_RESULTS_TTL,
        };
        let engine = FakeEngine::default();

        let registries =
            Registries::connect(&config, &FileSecretStore::new(&config.secrets_dir), &engine)
                .unwrap();

        assert_eq!(registries.source, "src.example.com");
        assert_eq!(
            registries.destination,
            "210987654321.dkr.ecr.us-gov-west-1.amazonaws.com"
        );
        assert_eq!(
            engine.logins(),
            vec![
                ("src.example.com".to_string(), "reader".to_string()),
                (registries.destination.clone(), "AKIA".to_string()),
            ]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
