//! Chunked upload with incremental content hashing

use crate::error::{PipelineError, Result};
use bytes::Bytes;
use common::TrackMetadata;
use crypto::{ContentHash, ContentHasher};
use futures_util::{Stream, StreamExt};
use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;
use storage::{BlobStore, CatalogStore};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};

/// One frame of an upload stream
#[derive(Debug, Clone)]
pub enum UploadFrame {
    Metadata(TrackMetadata),
    Chunk(Bytes),
}

/// Per-call upload state: scratch buffer plus running digest.
///
/// The scratch file is unlinked from creation, so dropping an uncommitted
/// session (stream error, client disconnect) leaves nothing on disk.
pub struct UploadSession {
    scratch: tokio::fs::File,
    hasher: ContentHasher,
    metadata: Option<TrackMetadata>,
    bytes_written: u64,
}

impl UploadSession {
    /// Append a chunk to the scratch buffer and feed the same bytes to the digest
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.scratch
            .write_all(chunk)
            .await
            .map_err(|e| PipelineError::internal("Failed to write to scratch buffer", e))?;
        self.hasher.update(chunk);
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Record the metadata frame; it may arrive at any point in the stream
    pub fn set_metadata(&mut self, metadata: TrackMetadata) {
        if self.metadata.is_some() {
            warn!("Upload stream carried more than one metadata frame, keeping the latest");
        }
        self.metadata = Some(metadata);
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Ingestion pipeline: scratch buffer -> blob store -> catalog upsert
pub struct IngestPipeline {
    blobs: Arc<dyn BlobStore>,
    catalog: Arc<dyn CatalogStore>,
    scratch_dir: PathBuf,
}

impl IngestPipeline {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        catalog: Arc<dyn CatalogStore>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            blobs,
            catalog,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Open a fresh upload session backed by an anonymous scratch file
    pub async fn begin(&self) -> Result<UploadSession> {
        let scratch_dir = self.scratch_dir.clone();
        let scratch = tokio::task::spawn_blocking(move || tempfile::tempfile_in(scratch_dir))
            .await
            .map_err(|e| PipelineError::internal("Scratch buffer task failed", e))?
            .map_err(|e| PipelineError::internal("Failed to create scratch buffer", e))?;

        Ok(UploadSession {
            scratch: tokio::fs::File::from_std(scratch),
            hasher: ContentHasher::new(),
            metadata: None,
            bytes_written: 0,
        })
    }

    /// Finish a session: finalize the hash, write the blob, then upsert the catalog record.
    ///
    /// A catalog failure leaves the blob in place; the reconciler's blob-orphan pass removes it.
    pub async fn commit(&self, session: UploadSession) -> Result<ContentHash> {
        let UploadSession {
            mut scratch,
            hasher,
            metadata,
            bytes_written,
        } = session;
        let hash = hasher.finalize();

        scratch
            .flush()
            .await
            .map_err(|e| PipelineError::internal("Failed to flush scratch buffer", e))?;
        scratch
            .seek(SeekFrom::Start(0))
            .await
            .map_err(|e| PipelineError::internal("Failed to rewind scratch buffer", e))?;

        let stored = self.blobs.put(hash.as_str(), scratch).await.map_err(|e| {
            error!(hash = %hash, "Blob write failed: {:#}", e);
            PipelineError::internal("Failed to write blob", e)
        })?;
        debug!(hash = %hash, bytes = stored, "Blob written");

        let metadata = metadata.unwrap_or_default();
        self.catalog.upsert(&hash, &metadata).await.map_err(|e| {
            error!(hash = %hash, "Catalog upsert failed, blob left for reconciliation: {:#}", e);
            PipelineError::internal("Failed to save metadata", e)
        })?;

        info!(
            hash = %hash,
            bytes = bytes_written,
            filename = ?metadata.filename,
            "Upload committed"
        );
        Ok(hash)
    }

    /// Consume a whole frame stream and commit it.
    /// Chunks are processed strictly in arrival order; a stream error aborts without any write.
    pub async fn ingest<S>(&self, frames: S) -> Result<ContentHash>
    where
        S: Stream<Item = Result<UploadFrame>>,
    {
        let mut session = self.begin().await?;
        futures_util::pin_mut!(frames);

        while let Some(frame) = frames.next().await {
            match frame? {
                UploadFrame::Metadata(metadata) => session.set_metadata(metadata),
                UploadFrame::Chunk(chunk) => session.write_chunk(&chunk).await?,
            }
        }

        self.commit(session).await
    }
}
