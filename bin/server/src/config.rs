use crate::constants::{
    BACKEND_DATABASE, BACKEND_FILESYSTEM, BACKEND_S3, DEFAULT_DATA_DIR, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_SCRATCH_SUBDIR,
};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use storage::{BlobBackend, CatalogBackend, DatabaseRetryConfig, S3Config};
use tracing::error;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub blob_store: BlobStoreType,
    pub catalog: CatalogType,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Data directory for filesystem blobs and catalog
    pub data_dir: PathBuf,
    /// Directory holding upload scratch buffers
    pub scratch_dir: PathBuf,
    /// Database URL for the database catalog
    pub database_url: Option<String>,
    pub database_retry_config: DatabaseRetryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobStoreType {
    Filesystem,
    S3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogType {
    Filesystem,
    Database,
}

fn invalid_input(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
}

fn command() -> Command {
    Command::new("server")
        .about("Content-addressed media store")
        .arg(
            Arg::new("blob-store")
                .long("blob-store")
                .value_name("TYPE")
                .help("Blob store backend: 'fs' for filesystem or 's3' for S3-compatible storage (S3_* env vars)")
                .default_value(BACKEND_FILESYSTEM),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("TYPE")
                .help("Catalog backend: 'fs' for a JSON file or 'db' for PostgreSQL")
                .default_value(BACKEND_FILESYSTEM),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Data directory for filesystem storage")
                .default_value(DEFAULT_DATA_DIR),
        )
        .arg(
            Arg::new("scratch-dir")
                .long("scratch-dir")
                .value_name("DIR")
                .help("Directory for upload scratch buffers (default: <data-dir>/scratch)"),
        )
        .arg(
            Arg::new("database-url")
                .long("database-url")
                .value_name("URL")
                .help("Database URL for the database catalog (can also use DATABASE_URL env var)"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("Server port (default: 8080, or SERVER_PORT env var)"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Server host (default: 0.0.0.0, or SERVER_HOST env var)"),
        )
}

impl ServerConfig {
    pub fn load() -> Result<Self, std::io::Error> {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, std::io::Error> {
        let blob_store = match matches
            .get_one::<String>("blob-store")
            .map(|s| s.as_str())
            .unwrap_or(BACKEND_FILESYSTEM)
        {
            BACKEND_FILESYSTEM => BlobStoreType::Filesystem,
            BACKEND_S3 => BlobStoreType::S3,
            other => {
                return Err(invalid_input(format!(
                    "Invalid blob store: {}. Must be '{}' or '{}'",
                    other, BACKEND_FILESYSTEM, BACKEND_S3
                )))
            }
        };

        let catalog = match matches
            .get_one::<String>("catalog")
            .map(|s| s.as_str())
            .unwrap_or(BACKEND_FILESYSTEM)
        {
            BACKEND_FILESYSTEM => CatalogType::Filesystem,
            BACKEND_DATABASE => CatalogType::Database,
            other => {
                return Err(invalid_input(format!(
                    "Invalid catalog: {}. Must be '{}' or '{}'",
                    other, BACKEND_FILESYSTEM, BACKEND_DATABASE
                )))
            }
        };

        let data_dir = PathBuf::from(
            matches
                .get_one::<String>("data-dir")
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_DATA_DIR),
        );
        let scratch_dir = matches
            .get_one::<String>("scratch-dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_SCRATCH_SUBDIR));

        let database_url = if catalog == CatalogType::Database {
            Some(
                matches
                    .get_one::<String>("database-url")
                    .cloned()
                    .or_else(|| std::env::var("DATABASE_URL").ok())
                    .ok_or_else(|| {
                        error!("Database URL required for the database catalog. Set --database-url or DATABASE_URL env var");
                        invalid_input(
                            "Database URL required for the database catalog. Set --database-url or DATABASE_URL env var".to_string(),
                        )
                    })?,
            )
        } else {
            None
        };

        let env_host = std::env::var("SERVER_HOST").ok();
        let env_port = std::env::var("SERVER_PORT").ok();

        let host = matches
            .get_one::<String>("host")
            .map(|s| s.as_str())
            .or(env_host.as_deref())
            .unwrap_or(DEFAULT_HOST)
            .to_string();

        let port_str = matches
            .get_one::<String>("port")
            .map(|s| s.as_str())
            .or(env_port.as_deref())
            .unwrap_or(DEFAULT_PORT);

        let port = port_str
            .parse()
            .map_err(|_| invalid_input(format!("Invalid port number: {}", port_str)))?;

        Ok(ServerConfig {
            blob_store,
            catalog,
            host,
            port,
            data_dir,
            scratch_dir,
            database_url,
            database_retry_config: DatabaseRetryConfig::from_env(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn blob_backend(&self) -> BlobBackend {
        match self.blob_store {
            BlobStoreType::Filesystem => {
                BlobBackend::Filesystem(self.data_dir.to_string_lossy().into_owned())
            }
            BlobStoreType::S3 => BlobBackend::S3(S3Config::from_env()),
        }
    }

    pub fn catalog_backend(&self) -> CatalogBackend {
        match (&self.catalog, &self.database_url) {
            (CatalogType::Database, Some(database_url)) => CatalogBackend::Database {
                database_url: database_url.clone(),
                retry_config: Some(self.database_retry_config),
            },
            _ => CatalogBackend::Filesystem(self.data_dir.to_string_lossy().into_owned()),
        }
    }
}
