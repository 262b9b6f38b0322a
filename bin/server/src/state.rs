//! Server application state

use pipeline::MediaVault;
use std::path::PathBuf;
use std::sync::Arc;
use storage::{BlobStore, CatalogStore};

/// Pipelines shared by every worker, all wired to the same two stores
pub struct AppState {
    pub vault: MediaVault,
}

impl AppState {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        catalog: Arc<dyn CatalogStore>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            vault: MediaVault::new(blobs, catalog, scratch_dir),
        }
    }
}
