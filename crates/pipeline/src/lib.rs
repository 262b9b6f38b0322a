pub mod delete;
pub mod enumerate;
pub mod error;
pub mod ingest;
pub mod reconcile;
pub mod retrieve;

#[cfg(test)]
pub(crate) mod testing;

pub use delete::DeletionPipeline;
pub use enumerate::CatalogEnumerator;
pub use error::{PipelineError, Result};
pub use ingest::{IngestPipeline, UploadFrame, UploadSession};
pub use reconcile::{ReconcileMode, Reconciler};
pub use retrieve::{ChunkStream, RetrievalPipeline};

use std::path::PathBuf;
use std::sync::Arc;
use storage::{BlobStore, CatalogStore};

/// Every pipeline wired to the same pair of stores
pub struct MediaVault {
    pub ingest: IngestPipeline,
    pub retrieve: RetrievalPipeline,
    pub delete: DeletionPipeline,
    pub enumerate: CatalogEnumerator,
    pub reconcile: Reconciler,
}

impl MediaVault {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        catalog: Arc<dyn CatalogStore>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ingest: IngestPipeline::new(Arc::clone(&blobs), Arc::clone(&catalog), scratch_dir),
            retrieve: RetrievalPipeline::new(Arc::clone(&blobs)),
            delete: DeletionPipeline::new(Arc::clone(&blobs), Arc::clone(&catalog)),
            enumerate: CatalogEnumerator::new(Arc::clone(&catalog)),
            reconcile: Reconciler::new(blobs, catalog),
        }
    }
}
