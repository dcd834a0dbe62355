//! Ferry Runner
//!
//! The replication job started by the orchestrator for each batch.
//!
//! Architecture:
//! - Configuration: registries, credentials and store settings from the environment
//! - Registry: host resolution and login for both ends of the replication
//! - Replication: ordered directive processing over a per-batch image cache
//! - Service: retrieve the batch, replicate it, report the failures
//!
//! Exits non-zero on any error that is not tied to a single message, so the
//! orchestrator sees the job as failed.

mod config;
mod podman;
mod registry;
mod replication;
mod secrets;
mod service;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ferry_core::domain::batch::BatchHandle;
use ferry_store::{BatchRecords, DEFAULT_RECORDS_TTL, PgRecordStore, RecordStore, ResultReporter};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::podman::PodmanEngine;
use crate::registry::Registries;
use crate::secrets::FileSecretStore;
use crate::service::{ReplicationService, StandardReplicationService};

#[derive(Parser)]
#[command(name = "ferry-runner")]
#[command(about = "Replicate a captured batch of image changes", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replicate the batch captured under a handle
    Run {
        /// Batch handle passed by the orchestrator
        #[arg(env = "BATCH_HANDLE")]
        batch_handle: BatchHandle,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "ferry_runner=debug,ferry_store=debug,ferry_client=debug"
    } else {
        "ferry_runner=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run { batch_handle } => run(batch_handle).await,
    }
}

async fn run(handle: BatchHandle) -> Result<()> {
    info!("Starting Ferry Runner for batch {}", handle);

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let engine = Arc::new(PodmanEngine::new());
    engine.check_available()?;

    let secrets = FileSecretStore::new(&config.secrets_dir);
    let registries = Registries::connect(&config, &secrets, engine.as_ref())
        .context("Failed to log in to registries")?;
    info!(
        "Replicating from {} to {}",
        registries.source, registries.destination
    );

    let pool = ferry_store::db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;
    let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool));

    let service = StandardReplicationService::new(
        BatchRecords::new(store.clone(), DEFAULT_RECORDS_TTL),
        ResultReporter::new(store, config.results_ttl),
        engine,
        registries,
    );

    let failures = service.run(handle).await?;
    info!("Batch {} done, {} records failed", handle, failures.len());

    Ok(())
}
