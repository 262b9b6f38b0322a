pub mod file_utils;

use crypto::ContentHash;
use serde::{Deserialize, Serialize};

/// Size of each chunk in a download stream (64 KiB)
pub const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Multipart part name carrying the JSON-encoded track metadata
pub const METADATA_PART: &str = "metadata";

/// Multipart part name carrying a slice of the binary payload
pub const CHUNK_PART: &str = "chunk";

/// Descriptive fields supplied by the uploader. Every field is optional on the wire.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TrackMetadata {
    pub filename: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: i32, // seconds
}

/// Response to a completed upload
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    pub hash: ContentHash,
}

/// Response to a delete request
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DeleteResponse {
    pub success: bool,
}

/// One playable entry of the catalog
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub hash: ContentHash,
    pub filename: String,
}

/// Catalog listing in filename mode (filtered to recognized media)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CatalogFilesResponse {
    pub files: Vec<CatalogEntry>,
}

/// Catalog listing in hash-only mode (exhaustive)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CatalogHashesResponse {
    pub hashes: Vec<ContentHash>,
}

/// Which reconciliation pass(es) to run
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReconcilePass {
    Catalog,
    Blobs,
    #[default]
    All,
}

/// Operator request to run the consistency reconciler
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ReconcileRequest {
    /// false = report only, true = repair
    #[serde(default)]
    pub repair: bool,
    #[serde(default)]
    pub pass: ReconcilePass,
}

/// Result of the catalog-orphan pass
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogOrphanReport {
    /// Active records checked against the blob store
    pub checked: usize,
    /// Hashes of active records whose blob is missing
    pub orphans: Vec<ContentHash>,
    /// Records tombstoned (repair mode only)
    pub tombstoned: usize,
    /// Per-item backend failures (logged, not fatal)
    pub errors: usize,
}

/// Result of the blob-orphan pass
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlobOrphanReport {
    /// Blob keys enumerated
    pub scanned: usize,
    /// Keys not covered by any active record
    pub orphans: Vec<String>,
    /// Blobs hard-deleted (repair mode only)
    pub deleted: usize,
    pub errors: usize,
}

/// Combined reconciler output; a pass that did not run is `None`
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ReconcileResponse {
    pub repair: bool,
    pub catalog: Option<CatalogOrphanReport>,
    pub blobs: Option<BlobOrphanReport>,
}

/// Error body returned by the server
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response from health check endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String, // "ok" when healthy
}
