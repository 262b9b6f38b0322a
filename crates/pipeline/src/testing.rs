//! Store fixtures shared by the pipeline tests

use crate::error::Result;
use crate::{
    CatalogEnumerator, DeletionPipeline, IngestPipeline, Reconciler, RetrievalPipeline, UploadFrame,
};
use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use common::TrackMetadata;
use crypto::ContentHash;
use futures_util::Stream;
use std::sync::Arc;
use storage::{BlobStore, CatalogStore, ContentRecord, FilesystemBlobStore, FilesystemCatalog};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

pub fn meta(filename: &str) -> UploadFrame {
    UploadFrame::Metadata(TrackMetadata {
        filename: filename.to_string(),
        ..Default::default()
    })
}

pub fn chunk(bytes: &[u8]) -> UploadFrame {
    UploadFrame::Chunk(Bytes::copy_from_slice(bytes))
}

pub fn frames(frames: Vec<UploadFrame>) -> impl Stream<Item = Result<UploadFrame>> {
    futures_util::stream::iter(frames.into_iter().map(Ok))
}

/// Write a blob directly, bypassing the catalog
pub async fn write_raw_blob(stores: &TestStores, key: &str, body: &[u8]) {
    let path = stores.dir.path().join("raw-blob");
    tokio::fs::write(&path, body).await.unwrap();
    let file = tokio::fs::File::open(&path).await.unwrap();
    stores.blobs.put(key, file).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();
}

/// Catalog whose every call fails, standing in for an unreachable database
pub struct FailingCatalog;

#[async_trait]
impl CatalogStore for FailingCatalog {
    async fn upsert(&self, _: &ContentHash, _: &TrackMetadata) -> anyhow::Result<ContentRecord> {
        Err(anyhow!("catalog unavailable"))
    }
    async fn find_active(&self, _: &ContentHash) -> anyhow::Result<Option<ContentRecord>> {
        Err(anyhow!("catalog unavailable"))
    }
    async fn tombstone(&self, _: &ContentHash) -> anyhow::Result<bool> {
        Err(anyhow!("catalog unavailable"))
    }
    async fn list_active(&self) -> anyhow::Result<Vec<ContentRecord>> {
        Err(anyhow!("catalog unavailable"))
    }
    async fn list_active_hashes(&self) -> anyhow::Result<Vec<ContentHash>> {
        Err(anyhow!("catalog unavailable"))
    }
}

/// Filesystem blob store and catalog rooted in one temp directory
pub struct TestStores {
    pub dir: Arc<TempDir>,
    pub blobs: Arc<dyn BlobStore>,
    pub catalog: Arc<dyn CatalogStore>,
    fs_catalog: Arc<FilesystemCatalog>,
}

impl TestStores {
    pub async fn new() -> Self {
        Self::open(Arc::new(tempfile::tempdir().unwrap()), false).await
    }

    pub async fn with_failing_catalog() -> Self {
        Self::open(Arc::new(tempfile::tempdir().unwrap()), true).await
    }

    /// Same directory, working catalog
    pub async fn reopen(&self) -> Self {
        Self::open(Arc::clone(&self.dir), false).await
    }

    async fn open(dir: Arc<TempDir>, failing: bool) -> Self {
        let blobs = Arc::new(FilesystemBlobStore::new(dir.path()).await.unwrap());
        let fs_catalog = Arc::new(FilesystemCatalog::new(dir.path()).await.unwrap());
        let catalog: Arc<dyn CatalogStore> = if failing {
            Arc::new(FailingCatalog)
        } else {
            fs_catalog.clone()
        };
        Self {
            dir,
            blobs,
            catalog,
            fs_catalog,
        }
    }

    pub fn fs_catalog(&self) -> &FilesystemCatalog {
        &self.fs_catalog
    }

    pub fn ingest(&self) -> IngestPipeline {
        IngestPipeline::new(
            Arc::clone(&self.blobs),
            Arc::clone(&self.catalog),
            self.dir.path(),
        )
    }

    pub fn retrieve(&self) -> RetrievalPipeline {
        RetrievalPipeline::new(Arc::clone(&self.blobs))
    }

    pub fn delete(&self) -> DeletionPipeline {
        DeletionPipeline::new(Arc::clone(&self.blobs), Arc::clone(&self.catalog))
    }

    pub fn enumerate(&self) -> CatalogEnumerator {
        CatalogEnumerator::new(Arc::clone(&self.catalog))
    }

    pub fn reconcile(&self) -> Reconciler {
        Reconciler::new(Arc::clone(&self.blobs), Arc::clone(&self.catalog))
    }

    pub async fn blob_bytes(&self, hash: &ContentHash) -> Option<Vec<u8>> {
        let mut reader = self.blobs.open(hash.as_str()).await.unwrap()?;
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await.unwrap();
        Some(body)
    }
}
