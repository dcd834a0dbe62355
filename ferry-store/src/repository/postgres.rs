//! Postgres Record Repository
//!
//! Handles all database operations on the `ferry_records` table.

use async_trait::async_trait;
use ferry_core::domain::batch::BatchHandle;
use ferry_core::dto::record::{Record, RecordKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::repository::RecordStore;

/// Postgres implementation of [`RecordStore`]
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn put(&self, record: Record) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ferry_records (id, kind, payload, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id, kind)
            DO UPDATE SET payload = EXCLUDED.payload, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(record.handle.as_uuid())
        .bind(record.kind.as_str())
        .bind(&record.payload)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn put_if_absent(&self, record: Record) -> Result<()> {
        // An expired row that has not been purged yet does not count
        let result = sqlx::query(
            r#"
            INSERT INTO ferry_records (id, kind, payload, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id, kind)
            DO UPDATE SET payload = EXCLUDED.payload, expires_at = EXCLUDED.expires_at
            WHERE ferry_records.expires_at <= now()
            "#,
        )
        .bind(record.handle.as_uuid())
        .bind(record.kind.as_str())
        .bind(&record.payload)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists {
                handle: record.handle,
                kind: record.kind,
            });
        }

        Ok(())
    }

    async fn get(&self, handle: BatchHandle, kind: RecordKind) -> Result<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, payload, expires_at
            FROM ferry_records
            WHERE id = $1 AND kind = $2
            "#,
        )
        .bind(handle.as_uuid())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_record(kind)))
    }

    async fn delete(&self, handle: BatchHandle, kind: RecordKind) -> Result<()> {
        sqlx::query("DELETE FROM ferry_records WHERE id = $1 AND kind = $2")
            .bind(handle.as_uuid())
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM ferry_records WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    payload: serde_json::Value,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl RecordRow {
    fn into_record(self, kind: RecordKind) -> Record {
        Record {
            handle: BatchHandle::from(self.id),
            kind,
            payload: self.payload,
            expires_at: self.expires_at,
        }
    }
}
