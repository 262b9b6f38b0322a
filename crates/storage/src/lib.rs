pub mod backend;
pub mod database;
pub mod filesystem;
pub mod s3;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::TrackMetadata;
use crypto::ContentHash;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio::io::AsyncRead;

pub use backend::{BlobBackend, CatalogBackend};
pub use database::{DatabaseCatalog, DatabaseRetryConfig};
pub use filesystem::{catalog::FilesystemCatalog, FilesystemBlobStore};
pub use s3::{S3BlobStore, S3Config};

/// Content type used for every stored blob
pub const BLOB_CONTENT_TYPE: &str = "application/octet-stream";

/// Readable handle to a stored blob
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

/// One catalog row. At most one row per hash has `deleted_at == None`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContentRecord {
    pub hash: ContentHash,
    #[serde(flatten)]
    pub metadata: TrackMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Content-addressed binary storage.
/// Keys are plain object keys; the pipelines always use the content hash.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write the whole of `source` (positioned at offset 0) under `key`, replacing any existing blob.
    /// Returns the number of bytes stored.
    async fn put(&self, key: &str, source: tokio::fs::File) -> Result<u64>;

    /// Open a blob for reading, or `None` if the key does not exist
    async fn open(&self, key: &str) -> Result<Option<BlobReader>>;

    /// Check whether a blob exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove a blob. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Enumerate every key in the store
    async fn list_keys(&self) -> Result<Vec<String>>;
}

/// Relational metadata catalog with tombstone semantics
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Overwrite the active record for `hash` in place, or create a new active record
    /// when none exists (tombstoned rows never block creation)
    async fn upsert(&self, hash: &ContentHash, metadata: &TrackMetadata) -> Result<ContentRecord>;

    /// Load the active record for a hash
    async fn find_active(&self, hash: &ContentHash) -> Result<Option<ContentRecord>>;

    /// Tombstone the active record for a hash. Returns false when there was none.
    async fn tombstone(&self, hash: &ContentHash) -> Result<bool>;

    /// All active records ordered by hash
    async fn list_active(&self) -> Result<Vec<ContentRecord>>;

    /// Hashes of all active records ordered by hash
    async fn list_active_hashes(&self) -> Result<Vec<ContentHash>>;
}
