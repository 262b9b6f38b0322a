//! Chunked download of a stored blob

use crate::error::{PipelineError, Result};
use bytes::{Bytes, BytesMut};
use common::DOWNLOAD_CHUNK_SIZE;
use crypto::ContentHash;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use storage::{BlobReader, BlobStore};
use tokio::io::AsyncReadExt;
use tracing::{debug, error};

/// Ordered stream of blob chunks. Every chunk except the last is exactly
/// `DOWNLOAD_CHUNK_SIZE` bytes; an empty blob yields no chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

pub struct RetrievalPipeline {
    blobs: Arc<dyn BlobStore>,
}

impl RetrievalPipeline {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Resolve the blob for `hash` and return its chunk stream.
    ///
    /// A missing blob fails here, before the caller has sent anything, so a not-found
    /// never arrives as a partially delivered stream. The catalog is not consulted.
    pub async fn open(&self, hash: &str) -> Result<ChunkStream> {
        let hash = ContentHash::parse(hash)?;

        let reader = self
            .blobs
            .open(hash.as_str())
            .await
            .map_err(|e| PipelineError::internal("Failed to open blob", e))?
            .ok_or_else(|| PipelineError::NotFound(format!("File not found: {}", hash)))?;

        debug!(hash = %hash, "Streaming blob");
        Ok(chunk_stream(hash, reader))
    }
}

fn chunk_stream(hash: ContentHash, mut reader: BlobReader) -> ChunkStream {
    let stream = async_stream::try_stream! {
        let mut sent: u64 = 0;
        loop {
            let chunk = read_full_chunk(&mut reader).await.map_err(|e| {
                error!(hash = %hash, offset = sent, "Blob read failed: {}", e);
                PipelineError::internal("Failed to read blob", e)
            })?;
            if chunk.is_empty() {
                break;
            }
            let short = chunk.len() < DOWNLOAD_CHUNK_SIZE;
            sent += chunk.len() as u64;
            yield chunk;
            if short {
                break;
            }
        }
        debug!(hash = %hash, bytes = sent, "Blob stream finished");
    };

    Box::pin(stream)
}

/// Fill one chunk, looping over short reads; only end-of-blob produces a short chunk
async fn read_full_chunk(reader: &mut BlobReader) -> std::io::Result<Bytes> {
    let mut buf = BytesMut::zeroed(DOWNLOAD_CHUNK_SIZE);
    let mut filled = 0;
    while filled < DOWNLOAD_CHUNK_SIZE {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf.freeze())
}
