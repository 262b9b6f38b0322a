use crate::{
    database::DatabaseCatalog, filesystem::catalog::FilesystemCatalog,
    filesystem::FilesystemBlobStore, s3::S3BlobStore, BlobStore, CatalogStore,
    DatabaseRetryConfig, S3Config,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Blob store backend type
pub enum BlobBackend {
    /// Filesystem storage with data directory path
    Filesystem(String),
    /// S3-compatible object storage
    S3(S3Config),
}

impl BlobBackend {
    /// Initialize blob store backend based on type
    pub async fn initialize(self) -> Result<Arc<dyn BlobStore>> {
        match self {
            BlobBackend::Filesystem(data_dir) => {
                info!("Using filesystem blob store: {}", data_dir);
                let store = FilesystemBlobStore::new(data_dir).await?;
                Ok(Arc::new(store))
            }
            BlobBackend::S3(config) => {
                info!(
                    "Using S3 blob store: endpoint={}, bucket={}",
                    config.endpoint_url, config.bucket
                );
                let store = S3BlobStore::new(config).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Catalog backend type
pub enum CatalogBackend {
    /// JSON catalog file in the data directory
    Filesystem(String),
    /// PostgreSQL database
    Database {
        database_url: String,
        retry_config: Option<DatabaseRetryConfig>,
    },
}

impl CatalogBackend {
    /// Initialize catalog backend based on type
    pub async fn initialize(self) -> Result<Arc<dyn CatalogStore>> {
        match self {
            CatalogBackend::Filesystem(data_dir) => {
                info!("Using filesystem catalog: {}", data_dir);
                let catalog = FilesystemCatalog::new(data_dir).await?;
                Ok(Arc::new(catalog))
            }
            CatalogBackend::Database {
                database_url,
                retry_config,
            } => {
                info!("Using database catalog");
                let catalog =
                    DatabaseCatalog::new(&database_url, retry_config.unwrap_or_default()).await?;
                Ok(Arc::new(catalog))
            }
        }
    }
}
