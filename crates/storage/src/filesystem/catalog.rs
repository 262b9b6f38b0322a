//! JSON-file catalog. Every row, active or tombstoned, lives in one `catalog.json`.

use crate::{CatalogStore, ContentRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use common::TrackMetadata;
use crypto::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const CATALOG_FILE: &str = "catalog.json";

#[derive(Serialize, Deserialize, Default)]
struct CatalogFile {
    records: Vec<ContentRecord>,
}

impl CatalogFile {
    async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .context("Failed to stat catalog file")?
        {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read catalog")?;
        serde_json::from_str(&content).context("Failed to parse catalog")
    }

    /// Write to a sibling temp file, fsync, then rename over the catalog
    async fn save_atomic(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize catalog")?;
        let temp_path = path.with_extension(format!("json.{}", uuid::Uuid::new_v4()));

        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .context("Failed to create temp catalog file")?;
        file.write_all(json.as_bytes())
            .await
            .context("Failed to write catalog")?;
        file.sync_all()
            .await
            .context("Failed to sync catalog to disk")?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e).context("Failed to replace catalog file");
        }
        Ok(())
    }

    fn active(&self, hash: &ContentHash) -> Option<&ContentRecord> {
        self.records
            .iter()
            .find(|r| r.is_active() && &r.hash == hash)
    }

    fn active_mut(&mut self, hash: &ContentHash) -> Option<&mut ContentRecord> {
        self.records
            .iter_mut()
            .find(|r| r.is_active() && &r.hash == hash)
    }

    fn active_sorted(&self) -> Vec<ContentRecord> {
        let mut active: Vec<ContentRecord> = self
            .records
            .iter()
            .filter(|r| r.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| a.hash.cmp(&b.hash));
        active
    }
}

/// Filesystem catalog implementation.
/// Writers are serialized in-process; the file is the only state.
pub struct FilesystemCatalog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilesystemCatalog {
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .context("Failed to create catalog directory")?;
        Ok(Self {
            path: data_dir.join(CATALOG_FILE),
            lock: Mutex::new(()),
        })
    }

    /// Every stored row including tombstones, in insertion order
    pub async fn all_records(&self) -> Result<Vec<ContentRecord>> {
        let _guard = self.lock.lock().await;
        Ok(CatalogFile::load(&self.path).await?.records)
    }
}

#[async_trait]
impl CatalogStore for FilesystemCatalog {
    async fn upsert(&self, hash: &ContentHash, metadata: &TrackMetadata) -> Result<ContentRecord> {
        let _guard = self.lock.lock().await;
        let mut catalog = CatalogFile::load(&self.path).await?;
        let now = Utc::now();

        let record = match catalog.active_mut(hash) {
            Some(existing) => {
                existing.metadata = metadata.clone();
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let record = ContentRecord {
                    hash: hash.clone(),
                    metadata: metadata.clone(),
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                };
                catalog.records.push(record.clone());
                record
            }
        };

        catalog.save_atomic(&self.path).await?;
        Ok(record)
    }

    async fn find_active(&self, hash: &ContentHash) -> Result<Option<ContentRecord>> {
        let _guard = self.lock.lock().await;
        let catalog = CatalogFile::load(&self.path).await?;
        Ok(catalog.active(hash).cloned())
    }

    async fn tombstone(&self, hash: &ContentHash) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut catalog = CatalogFile::load(&self.path).await?;

        let Some(record) = catalog.active_mut(hash) else {
            return Ok(false);
        };
        let now = Utc::now();
        record.deleted_at = Some(now);
        record.updated_at = now;

        catalog.save_atomic(&self.path).await?;
        Ok(true)
    }

    async fn list_active(&self) -> Result<Vec<ContentRecord>> {
        let _guard = self.lock.lock().await;
        Ok(CatalogFile::load(&self.path).await?.active_sorted())
    }

    async fn list_active_hashes(&self) -> Result<Vec<ContentHash>> {
        Ok(self
            .list_active()
            .await?
            .into_iter()
            .map(|r| r.hash)
            .collect())
    }
}
