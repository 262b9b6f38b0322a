//! PostgreSQL catalog implementation

pub mod queries;
pub mod schema;

use crate::{CatalogStore, ContentRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use common::TrackMetadata;
use crypto::ContentHash;
use queries::Queries;
use schema::Schema;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

/// Connection retry policy, so the server may start before the database is reachable
#[derive(Debug, Clone, Copy)]
pub struct DatabaseRetryConfig {
    pub max_attempts: u32,
    pub initial_delay_seconds: u64,
}

impl Default for DatabaseRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_seconds: 1,
        }
    }
}

impl DatabaseRetryConfig {
    /// Read `DB_RETRY_MAX_ATTEMPTS` and `DB_RETRY_INITIAL_DELAY_SECONDS`, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_attempts = std::env::var("DB_RETRY_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.max_attempts);
        let initial_delay_seconds = std::env::var("DB_RETRY_INITIAL_DELAY_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.initial_delay_seconds);
        Self {
            max_attempts,
            initial_delay_seconds,
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling each time
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << (attempt.saturating_sub(1)).min(16);
        Duration::from_secs(self.initial_delay_seconds.saturating_mul(factor))
    }
}

/// PostgreSQL catalog implementation
pub struct DatabaseCatalog {
    pool: PgPool,
}

impl DatabaseCatalog {
    /// Connect (with retries) and make sure the schema exists
    pub async fn new(database_url: &str, retry_config: DatabaseRetryConfig) -> Result<Self> {
        let pool = Self::connect_with_retry(database_url, retry_config).await?;
        Schema::initialize(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool; the schema must already be initialized
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn connect_with_retry(database_url: &str, retry: DatabaseRetryConfig) -> Result<PgPool> {
        let mut attempt = 1;
        loop {
            match PgPool::connect(database_url).await {
                Ok(pool) => {
                    info!(attempt, "Connected to PostgreSQL");
                    return Ok(pool);
                }
                Err(e) if attempt < retry.max_attempts => {
                    let delay = retry.delay_for(attempt);
                    warn!(
                        "Database connection attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, retry.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e).context("Failed to connect to PostgreSQL database");
                }
            }
        }
    }
}

#[async_trait]
impl CatalogStore for DatabaseCatalog {
    async fn upsert(&self, hash: &ContentHash, metadata: &TrackMetadata) -> Result<ContentRecord> {
        Queries::upsert_record(&self.pool, hash, metadata).await
    }

    async fn find_active(&self, hash: &ContentHash) -> Result<Option<ContentRecord>> {
        Queries::find_active(&self.pool, hash).await
    }

    async fn tombstone(&self, hash: &ContentHash) -> Result<bool> {
        Ok(Queries::tombstone(&self.pool, hash).await? > 0)
    }

    async fn list_active(&self) -> Result<Vec<ContentRecord>> {
        Queries::list_active(&self.pool).await
    }

    async fn list_active_hashes(&self) -> Result<Vec<ContentHash>> {
        Queries::list_active_hashes(&self.pool).await
    }
}
