/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Default directory for downloaded files
pub const DOWNLOADED_DIR: &str = "downloaded";

/// Upload endpoint path
pub const UPLOAD_ENDPOINT: &str = "/upload";

/// Download endpoint path, followed by `/{hash}`
pub const DOWNLOAD_ENDPOINT: &str = "/download";

/// Delete endpoint path, followed by `/{hash}`
pub const FILES_ENDPOINT: &str = "/files";

/// Filtered catalog listing
pub const CATALOG_FILES_ENDPOINT: &str = "/catalog/files";

/// Exhaustive hash listing
pub const CATALOG_HASHES_ENDPOINT: &str = "/catalog/hashes";

/// Consistency reconciler
pub const RECONCILE_ENDPOINT: &str = "/admin/reconcile";

/// Size of each `chunk` part in an upload (1 MiB)
pub const UPLOAD_CHUNK_SIZE: usize = 1024 * 1024;
