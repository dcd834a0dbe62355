use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Batches and results share one table keyed by (handle, kind)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ferry_records (
            id UUID NOT NULL,
            kind VARCHAR(16) NOT NULL,
            payload JSONB NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (id, kind)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ferry_records_expires_at ON ferry_records(expires_at)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
