use crate::error::{PipelineError, Result};
use common::file_utils::is_supported_media;
use common::CatalogEntry;
use crypto::ContentHash;
use std::sync::Arc;
use storage::CatalogStore;
use tracing::debug;

/// Read-only views over the active catalog
pub struct CatalogEnumerator {
    catalog: Arc<dyn CatalogStore>,
}

impl CatalogEnumerator {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Active records whose filename has a recognized media extension
    pub async fn list_files(&self) -> Result<Vec<CatalogEntry>> {
        let records = self
            .catalog
            .list_active()
            .await
            .map_err(|e| PipelineError::internal("Failed to list catalog", e))?;
        let total = records.len();

        let files: Vec<CatalogEntry> = records
            .into_iter()
            .filter(|r| is_supported_media(&r.metadata.filename))
            .map(|r| CatalogEntry {
                hash: r.hash,
                filename: r.metadata.filename,
            })
            .collect();

        debug!(total, listed = files.len(), "Enumerated catalog files");
        Ok(files)
    }

    /// Every active hash, unfiltered
    pub async fn list_hashes(&self) -> Result<Vec<ContentHash>> {
        self.catalog
            .list_active_hashes()
            .await
            .map_err(|e| PipelineError::internal("Failed to list catalog hashes", e))
    }
}
