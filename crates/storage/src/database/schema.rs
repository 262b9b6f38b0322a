use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

/// Database schema manager
pub struct Schema;

impl Schema {
    /// Initialize the catalog table and its indexes
    pub async fn initialize(pool: &PgPool) -> Result<()> {
        Self::create_content_records_table(pool).await?;
        Self::create_indexes(pool).await?;
        info!("PostgreSQL catalog schema initialized");
        Ok(())
    }

    /// Create content_records table. Rows are never hard-deleted; `deleted_at` is the tombstone.
    async fn create_content_records_table(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_records (
                id BIGSERIAL PRIMARY KEY,
                hash VARCHAR(64) NOT NULL,
                filename TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL DEFAULT '',
                artist TEXT NOT NULL DEFAULT '',
                album TEXT NOT NULL DEFAULT '',
                duration INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                deleted_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create content_records table")?;
        Ok(())
    }

    /// Uniqueness on hash covers active rows only, so a tombstone never blocks re-ingestion
    async fn create_indexes(pool: &PgPool) -> Result<()> {
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_content_records_active_hash
             ON content_records(hash) WHERE deleted_at IS NULL",
        )
        .execute(pool)
        .await
        .context("Failed to create active hash index")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_content_records_hash ON content_records(hash)")
            .execute(pool)
            .await
            .context("Failed to create hash index")?;
        Ok(())
    }
}
