use crate::constants::{UPLOAD_CHUNK_SIZE, UPLOAD_ENDPOINT};
use crate::response_error;
use anyhow::{Context, Result};
use common::{TrackMetadata, UploadResponse, CHUNK_PART, METADATA_PART};
use crate::download::HashingWriter;
use log::{debug, info};
use reqwest::blocking::{multipart, Client};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Optional descriptive fields given on the command line
#[derive(Debug, Default, Clone)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<i32>,
}

/// Handles file uploads to the server
pub struct FileUploader {
    server: String,
    client: Client,
}

impl FileUploader {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Upload one file, returning the hash the server assigned.
    /// The hash is computed locally as well and the two must agree.
    pub fn upload(&self, path: &Path, info: &TrackInfo) -> Result<String> {
        let metadata = build_metadata(path, info)?;
        let (form, local_hash, size) = self.build_multipart_form(path, &metadata)?;

        info!("Uploading {:?} ({} bytes)", path, size);
        let url = format!("{}{}", self.server, UPLOAD_ENDPOINT);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .context("Failed to connect to server")?;

        if !response.status().is_success() {
            return Err(response_error("Upload failed", response));
        }

        let uploaded: UploadResponse = response.json().context("Invalid upload response")?;
        anyhow::ensure!(
            uploaded.hash.as_str() == local_hash,
            "Server hash {} does not match local hash {}",
            uploaded.hash,
            local_hash
        );

        println!("Uploaded {}: {}", metadata.filename, uploaded.hash);
        Ok(uploaded.hash.to_string())
    }

    /// Metadata part first, then the payload split into fixed-size chunk parts.
    /// Chunk parts read their byte range from disk while the request body is sent.
    fn build_multipart_form(
        &self,
        path: &Path,
        metadata: &TrackMetadata,
    ) -> Result<(multipart::Form, String, u64)> {
        let (local_hash, size) = hash_file(path)?;

        let metadata_json =
            serde_json::to_string(metadata).context("Failed to serialize metadata")?;
        let mut form = multipart::Form::new().part(
            METADATA_PART,
            multipart::Part::text(metadata_json)
                .mime_str("application/json")
                .context("Failed to set MIME type")?,
        );

        let mut chunks = 0usize;
        for offset in (0..size).step_by(UPLOAD_CHUNK_SIZE) {
            let len = (size - offset).min(UPLOAD_CHUNK_SIZE as u64);
            form = form.part(
                CHUNK_PART,
                multipart::Part::reader_with_length(FileRange::new(path, offset, len), len)
                    .file_name(metadata.filename.clone())
                    .mime_str("application/octet-stream")
                    .context("Failed to set MIME type")?,
            );
            chunks += 1;
        }

        debug!("Prepared {} chunk parts for {:?}", chunks, path);
        Ok((form, local_hash, size))
    }
}

/// Stream the file through the content hasher without buffering it
fn hash_file(path: &Path) -> Result<(String, u64)> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut writer = HashingWriter::new(io::sink());
    io::copy(&mut file, &mut writer).with_context(|| format!("Failed to read {:?}", path))?;
    let (hash, size) = writer.finish()?;
    Ok((hash.to_string(), size))
}

/// One byte range of a file, opened on first read and closed once the range is exhausted,
/// so a form with many chunk parts keeps at most one handle open at a time.
struct FileRange {
    path: PathBuf,
    offset: u64,
    remaining: u64,
    file: Option<File>,
}

impl FileRange {
    fn new(path: &Path, offset: u64, len: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            offset,
            remaining: len,
            file: None,
        }
    }
}

impl Read for FileRange {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        if self.file.is_none() {
            let mut file = File::open(&self.path)?;
            file.seek(SeekFrom::Start(self.offset))?;
            self.file = Some(file);
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(0);
        };

        let limit = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = file.read(&mut buf[..limit])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{:?} shrank during upload", self.path),
            ));
        }
        self.remaining -= n as u64;
        if self.remaining == 0 {
            self.file = None;
        }
        Ok(n)
    }
}

fn build_metadata(path: &Path, info: &TrackInfo) -> Result<TrackMetadata> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Path has no usable file name: {:?}", path))?;

    if !common::file_utils::is_supported_media(&filename) {
        log::warn!(
            "{} has no recognized media extension; it will not appear in the file listing",
            filename
        );
    }

    Ok(TrackMetadata {
        filename,
        title: info.title.clone().unwrap_or_default(),
        artist: info.artist.clone().unwrap_or_default(),
        album: info.album.clone().unwrap_or_default(),
        duration: info.duration.unwrap_or_default(),
    })
}
