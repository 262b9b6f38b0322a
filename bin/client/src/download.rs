use crate::constants::{DOWNLOADED_DIR, DOWNLOAD_ENDPOINT};
use crate::response_error;
use anyhow::{Context, Result};
use crypto::{ContentHash, ContentHasher};
use log::info;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writer that hashes everything passing through it
pub(crate) struct HashingWriter<W> {
    inner: W,
    hasher: ContentHasher,
    written: u64,
}

impl<W: Write> HashingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: ContentHasher::new(),
            written: 0,
        }
    }

    pub(crate) fn finish(mut self) -> io::Result<(ContentHash, u64)> {
        self.inner.flush()?;
        Ok((self.hasher.finalize(), self.written))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Handles file downloads and verification
pub struct FileDownloader {
    server: String,
    client: Client,
}

impl FileDownloader {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Stream a blob to disk and check that its bytes hash back to the requested hash.
    /// A mismatched or truncated download is deleted.
    pub fn download_and_verify(&self, hash: &str, output: Option<&Path>) -> Result<PathBuf> {
        let expected = ContentHash::parse(hash).context("Invalid content hash")?;
        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DOWNLOADED_DIR).join(expected.as_str()));

        let url = format!("{}{}/{}", self.server, DOWNLOAD_ENDPOINT, expected);
        let mut response = self
            .client
            .get(&url)
            .send()
            .context("Failed to connect to server")?;
        if !response.status().is_success() {
            return Err(response_error("Download failed", response));
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
        let file = File::create(&output_path)
            .with_context(|| format!("Failed to create {:?}", output_path))?;
        let mut writer = HashingWriter::new(file);

        let result = response
            .copy_to(&mut writer)
            .context("Download interrupted")
            .and_then(|_| writer.finish().context("Failed to flush download"))
            .and_then(|(actual, size)| {
                anyhow::ensure!(
                    actual == expected,
                    "Content hash mismatch: expected {}, got {}",
                    expected,
                    actual
                );
                Ok(size)
            });

        match result {
            Ok(size) => {
                info!("Downloaded {} ({} bytes) to {:?}", expected, size, output_path);
                println!("✓ Verified {} -> {}", expected, output_path.display());
                Ok(output_path)
            }
            Err(e) => {
                let _ = fs::remove_file(&output_path);
                Err(e)
            }
        }
    }
}
