//! Ferry Orchestrator
//!
//! HTTP front of the replication pipeline.
//!
//! Architecture:
//! - API: `/events` classifies registry events onto the delivery queue,
//!   `/batches` runs one replication job per delivered batch
//! - Scheduler: job dispatch and deadline-bounded status polling
//! - Services: ingress and batch handling over the record store

use anyhow::{Context, Result};
use ferry_client::{HttpDeliveryQueue, HttpJobRunner};
use ferry_store::{BatchRecords, PgRecordStore, RecordStore, ResultReporter};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod scheduler;
mod service;
mod state;

#[cfg(test)]
mod testing;

use crate::config::Config;
use crate::scheduler::JobDispatcher;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferry_orchestrator=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ferry Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    tracing::info!(
        "Loaded configuration: project={}, runner={} ({}), batch_timeout={:?}",
        config.project,
        config.runner_url,
        config.runner_kind,
        config.batch_timeout
    );

    tracing::info!("Connecting to database...");
    let pool = ferry_store::db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;
    ferry_store::db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool));
    tokio::spawn(ferry_store::purge_periodically(
        store.clone(),
        config.purge_interval,
    ));

    let runner = Arc::new(HttpJobRunner::new(config.runner_url.clone(), config.runner_kind));

    let state = AppState {
        records: BatchRecords::new(store.clone(), config.records_ttl),
        results: ResultReporter::new(store, config.results_ttl),
        dispatcher: Arc::new(JobDispatcher::new(
            runner,
            config.project.clone(),
            config.poller,
        )),
        queue: Arc::new(HttpDeliveryQueue::new(config.queue_url.clone())),
        batch_timeout: config.batch_timeout,
    };

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
