/// Default data directory for filesystem blobs and catalog
pub const DEFAULT_DATA_DIR: &str = "server_data";

/// Scratch directory name under the data directory, used when none is given
pub const DEFAULT_SCRATCH_SUBDIR: &str = "scratch";

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: &str = "8080";

/// Backend identifier for local filesystem storage (default for both stores)
pub const BACKEND_FILESYSTEM: &str = "fs";

/// Blob store identifier for S3-compatible object storage
pub const BACKEND_S3: &str = "s3";

/// Catalog identifier for PostgreSQL
pub const BACKEND_DATABASE: &str = "db";
