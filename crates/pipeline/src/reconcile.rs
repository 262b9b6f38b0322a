//! Offline repair passes that restore agreement between the catalog and the blob store.
//!
//! Each pass enumerates one store once, then checks and repairs item by item with a
//! fresh query, so records or blobs created after the enumeration are never removed.

use crate::enumerate::CatalogEnumerator;
use crate::error::{PipelineError, Result};
use common::{BlobOrphanReport, CatalogOrphanReport, ReconcilePass, ReconcileResponse};
use crypto::ContentHash;
use std::collections::HashSet;
use std::sync::Arc;
use storage::{BlobStore, CatalogStore};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Log divergence, change nothing
    ReportOnly,
    /// Tombstone catalog orphans, hard-delete blob orphans
    Repair,
}

impl ReconcileMode {
    pub fn from_repair_flag(repair: bool) -> Self {
        if repair {
            ReconcileMode::Repair
        } else {
            ReconcileMode::ReportOnly
        }
    }

    pub fn is_repair(self) -> bool {
        self == ReconcileMode::Repair
    }
}

pub struct Reconciler {
    blobs: Arc<dyn BlobStore>,
    catalog: Arc<dyn CatalogStore>,
    enumerator: CatalogEnumerator,
}

impl Reconciler {
    pub fn new(blobs: Arc<dyn BlobStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        let enumerator = CatalogEnumerator::new(Arc::clone(&catalog));
        Self {
            blobs,
            catalog,
            enumerator,
        }
    }

    /// Run the selected passes. With `All` both passes run concurrently.
    pub async fn run(&self, mode: ReconcileMode, pass: ReconcilePass) -> Result<ReconcileResponse> {
        let (catalog, blobs) = match pass {
            ReconcilePass::Catalog => (Some(self.catalog_orphan_pass(mode).await?), None),
            ReconcilePass::Blobs => (None, Some(self.blob_orphan_pass(mode).await?)),
            ReconcilePass::All => {
                let (catalog, blobs) =
                    tokio::join!(self.catalog_orphan_pass(mode), self.blob_orphan_pass(mode));
                (Some(catalog?), Some(blobs?))
            }
        };

        Ok(ReconcileResponse {
            repair: mode.is_repair(),
            catalog,
            blobs,
        })
    }

    /// Active records whose blob is missing
    pub async fn catalog_orphan_pass(&self, mode: ReconcileMode) -> Result<CatalogOrphanReport> {
        let hashes = self.enumerator.list_hashes().await?;
        let mut report = CatalogOrphanReport {
            checked: hashes.len(),
            ..Default::default()
        };

        for hash in hashes {
            match self.blobs.exists(hash.as_str()).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(hash = %hash, "Failed to stat blob: {:#}", e);
                    report.errors += 1;
                    continue;
                }
            }

            warn!(hash = %hash, "Catalog orphan: active record has no blob");
            report.orphans.push(hash.clone());

            if mode.is_repair() {
                match self.repair_catalog_orphan(&hash).await {
                    Ok(true) => report.tombstoned += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(hash = %hash, "Failed to tombstone orphan record: {:#}", e);
                        report.errors += 1;
                    }
                }
            }
        }

        info!(
            checked = report.checked,
            orphans = report.orphans.len(),
            tombstoned = report.tombstoned,
            errors = report.errors,
            repair = mode.is_repair(),
            "Catalog-orphan pass finished"
        );
        Ok(report)
    }

    /// Re-stat right before tombstoning; a blob that reappeared belongs to a concurrent upload
    async fn repair_catalog_orphan(&self, hash: &ContentHash) -> anyhow::Result<bool> {
        if self.blobs.exists(hash.as_str()).await? {
            info!(hash = %hash, "Blob reappeared, keeping record");
            return Ok(false);
        }
        self.catalog.tombstone(hash).await
    }

    /// Blobs not covered by any active record
    pub async fn blob_orphan_pass(&self, mode: ReconcileMode) -> Result<BlobOrphanReport> {
        let keys = self
            .blobs
            .list_keys()
            .await
            .map_err(|e| PipelineError::internal("Failed to list blobs", e))?;
        let active: HashSet<ContentHash> = self.enumerator.list_hashes().await?.into_iter().collect();

        let mut report = BlobOrphanReport {
            scanned: keys.len(),
            ..Default::default()
        };

        for key in keys {
            let hash = parse_blob_key(&key);
            if hash.as_ref().map_or(false, |h| active.contains(h)) {
                continue;
            }

            warn!(key = %key, "Blob orphan: no active record");
            report.orphans.push(key.clone());

            if mode.is_repair() {
                match self.repair_blob_orphan(&key, hash.as_ref()).await {
                    Ok(true) => report.deleted += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(key = %key, "Failed to delete orphan blob: {:#}", e);
                        report.errors += 1;
                    }
                }
            }
        }

        info!(
            scanned = report.scanned,
            orphans = report.orphans.len(),
            deleted = report.deleted,
            errors = report.errors,
            repair = mode.is_repair(),
            "Blob-orphan pass finished"
        );
        Ok(report)
    }

    /// Re-query the catalog right before deleting; a record created since the listing keeps its blob
    async fn repair_blob_orphan(&self, key: &str, hash: Option<&ContentHash>) -> anyhow::Result<bool> {
        if let Some(hash) = hash {
            if self.catalog.find_active(hash).await?.is_some() {
                info!(key = %key, "Record appeared, keeping blob");
                return Ok(false);
            }
        }
        self.blobs.delete(key).await?;
        Ok(true)
    }
}

/// A key names a catalog hash only in canonical lowercase form
fn parse_blob_key(key: &str) -> Option<ContentHash> {
    ContentHash::parse(key)
        .ok()
        .filter(|hash| hash.as_str() == key)
}
