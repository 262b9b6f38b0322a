//! Filesystem-based blob storage

pub mod catalog;

use crate::{BlobReader, BlobStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use common::file_utils;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Prefix of in-flight writes; such files are never reported as keys
const TEMP_PREFIX: &str = ".tmp-";

/// Filesystem-based blob storage: one file per key under `<data_dir>/blobs`
pub struct FilesystemBlobStore {
    blob_dir: PathBuf,
}

impl FilesystemBlobStore {
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let blob_dir = data_dir.into().join("blobs");
        tokio::fs::create_dir_all(&blob_dir)
            .await
            .with_context(|| format!("Failed to create blob directory: {:?}", blob_dir))?;
        Ok(Self { blob_dir })
    }

    pub fn blob_dir(&self) -> &Path {
        &self.blob_dir
    }

    fn get_blob_path(&self, key: &str) -> Result<PathBuf> {
        file_utils::validate_object_key(key)
            .map_err(|e| anyhow::anyhow!("{}: {:?}", e.message(), key))?;
        Ok(self.blob_dir.join(key))
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &str, mut source: tokio::fs::File) -> Result<u64> {
        let blob_path = self.get_blob_path(key)?;
        let temp_path = self
            .blob_dir
            .join(format!("{}{}", TEMP_PREFIX, uuid::Uuid::new_v4()));

        let written = async {
            let mut temp_file = tokio::fs::File::create(&temp_path)
                .await
                .context("Failed to create temp blob file")?;
            let written = tokio::io::copy(&mut source, &mut temp_file)
                .await
                .context("Failed to copy blob contents")?;
            temp_file.flush().await.context("Failed to flush blob")?;
            temp_file
                .sync_all()
                .await
                .context("Failed to sync blob to disk")?;
            tokio::fs::rename(&temp_path, &blob_path)
                .await
                .with_context(|| format!("Failed to move blob into place: {:?}", blob_path))?;
            Ok::<u64, anyhow::Error>(written)
        }
        .await;

        if written.is_err() {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        let written = written?;
        debug!(key = %key, bytes = written, "Stored blob on filesystem");
        Ok(written)
    }

    async fn open(&self, key: &str) -> Result<Option<BlobReader>> {
        let blob_path = self.get_blob_path(key)?;
        match tokio::fs::File::open(&blob_path).await {
            Ok(file) => Ok(Some(Box::pin(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to open blob: {:?}", blob_path)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let blob_path = self.get_blob_path(key)?;
        tokio::fs::try_exists(&blob_path)
            .await
            .with_context(|| format!("Failed to stat blob: {:?}", blob_path))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let blob_path = self.get_blob_path(key)?;
        match tokio::fs::remove_file(&blob_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete blob: {:?}", blob_path)),
        }
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.blob_dir)
            .await
            .context("Failed to read blob directory")?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with(TEMP_PREFIX) {
                    keys.push(name.to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
