use crate::error::{PipelineError, Result};
use crypto::ContentHash;
use std::sync::Arc;
use storage::{BlobStore, CatalogStore};
use tracing::{error, info};

/// Removes the blob, then tombstones the catalog record
pub struct DeletionPipeline {
    blobs: Arc<dyn BlobStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl DeletionPipeline {
    pub fn new(blobs: Arc<dyn BlobStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { blobs, catalog }
    }

    /// Idempotent: deleting an unknown or already deleted hash succeeds.
    ///
    /// If the blob removal fails the catalog is left untouched. If the tombstone
    /// fails the blob is already gone and the record becomes a catalog orphan.
    pub async fn delete(&self, hash: &str) -> Result<()> {
        let hash = ContentHash::parse(hash)?;

        self.blobs.delete(hash.as_str()).await.map_err(|e| {
            error!(hash = %hash, "Blob removal failed: {:#}", e);
            PipelineError::internal("Failed to delete blob", e)
        })?;

        let tombstoned = self.catalog.tombstone(&hash).await.map_err(|e| {
            error!(hash = %hash, "Tombstone failed after blob removal: {:#}", e);
            PipelineError::internal("Failed to delete metadata", e)
        })?;

        info!(hash = %hash, tombstoned, "Delete completed");
        Ok(())
    }
}
