//! S3-compatible object storage (MinIO, RustFS, AWS)

use crate::{BlobReader, BlobStore, BLOB_CONTENT_TYPE};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

/// Connection settings for an S3-compatible endpoint
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: String,
}

impl S3Config {
    /// Read `S3_ENDPOINT`, `S3_ACCESS_KEY`, `S3_SECRET_KEY`, `S3_BUCKET`, `S3_REGION`, `S3_USE_SSL`.
    /// A bare `host:port` endpoint gets a scheme from `S3_USE_SSL`.
    pub fn from_env() -> Self {
        fn get_env(key: &str, fallback: &str) -> String {
            std::env::var(key).unwrap_or_else(|_| fallback.to_string())
        }

        let endpoint = get_env("S3_ENDPOINT", "localhost:9000");
        let use_ssl = get_env("S3_USE_SSL", "false") == "true";
        let endpoint_url = if endpoint.contains("://") {
            endpoint
        } else if use_ssl {
            format!("https://{}", endpoint)
        } else {
            format!("http://{}", endpoint)
        };

        Self {
            endpoint_url,
            access_key_id: get_env("S3_ACCESS_KEY", "minioadmin"),
            secret_access_key: get_env("S3_SECRET_KEY", "minioadmin"),
            bucket: get_env("S3_BUCKET", "music"),
            region: get_env("S3_REGION", "us-east-1"),
        }
    }
}

/// Blob store backed by a single bucket, object key = content hash
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Build a client and make sure the bucket exists
    pub async fn new(config: S3Config) -> Result<Self> {
        let client = Self::create_client(&config).await;
        let store = Self {
            client,
            bucket: config.bucket,
        };
        store.ensure_bucket().await?;
        Ok(store)
    }

    async fn create_client(config: &S3Config) -> Client {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "static",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint_url.clone())
            .load()
            .await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true)
                .build(),
        )
    }

    /// Create the bucket if it does not exist yet
    pub async fn ensure_bucket(&self) -> Result<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().map_or(false, |e| e.is_not_found()) => {
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .with_context(|| format!("Failed to create bucket {}", self.bucket))?;
                info!(bucket = %self.bucket, "Bucket created");
                Ok(())
            }
            Err(err) => {
                Err(err).with_context(|| format!("Failed to check bucket {}", self.bucket))
            }
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, source: tokio::fs::File) -> Result<u64> {
        let length = source
            .metadata()
            .await
            .context("Failed to stat scratch file")?
            .len();
        let body = ByteStream::read_from()
            .file(source)
            .build()
            .await
            .context("Failed to prepare upload body")?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(BLOB_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to upload object {}", key))?;

        debug!(key = %key, bytes = length, "Stored blob in S3");
        Ok(length)
    }

    async fn open(&self, key: &str) -> Result<Option<BlobReader>> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(Box::pin(output.body.into_async_read()))),
            Err(err) if err.as_service_error().map_or(false, |e| e.is_no_such_key()) => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to get object {}", key)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().map_or(false, |e| e.is_not_found()) => Ok(false),
            Err(err) => Err(err).with_context(|| format!("Failed to stat object {}", key)),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // S3 reports success for keys that do not exist
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to delete object {}", key))?;
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let result = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .context("Failed to list objects")?;

            keys.extend(result.contents().iter().filter_map(|o| o.key().map(str::to_string)));

            match result.next_continuation_token() {
                Some(token) if result.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        keys.sort();
        Ok(keys)
    }
}
