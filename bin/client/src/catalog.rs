use crate::constants::{CATALOG_FILES_ENDPOINT, CATALOG_HASHES_ENDPOINT, FILES_ENDPOINT};
use crate::response_error;
use anyhow::{Context, Result};
use common::{CatalogFilesResponse, CatalogHashesResponse, DeleteResponse};
use crypto::ContentHash;
use log::info;
use reqwest::blocking::Client;

/// Catalog browsing and deletion
pub struct CatalogClient {
    server: String,
    client: Client,
}

impl CatalogClient {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Print the playable files, or every active hash with `hashes_only`
    pub fn list(&self, hashes_only: bool) -> Result<()> {
        if hashes_only {
            let listing: CatalogHashesResponse = self.get_json(CATALOG_HASHES_ENDPOINT)?;
            for hash in &listing.hashes {
                println!("{}", hash);
            }
            info!("{} active hashes", listing.hashes.len());
        } else {
            let listing: CatalogFilesResponse = self.get_json(CATALOG_FILES_ENDPOINT)?;
            for entry in &listing.files {
                println!("{}  {}", entry.hash, entry.filename);
            }
            info!("{} playable files", listing.files.len());
        }
        Ok(())
    }

    pub fn delete(&self, hash: &str) -> Result<()> {
        let hash = ContentHash::parse(hash).context("Invalid content hash")?;
        let url = format!("{}{}/{}", self.server, FILES_ENDPOINT, hash);
        let response = self
            .client
            .delete(&url)
            .send()
            .context("Failed to connect to server")?;
        if !response.status().is_success() {
            return Err(response_error("Delete failed", response));
        }

        let result: DeleteResponse = response.json().context("Invalid delete response")?;
        anyhow::ensure!(result.success, "Server reported delete failure for {}", hash);
        println!("Deleted {}", hash);
        Ok(())
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.server, endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to connect to server")?;
        if !response.status().is_success() {
            return Err(response_error("Catalog request failed", response));
        }
        response.json().context("Invalid catalog response")
    }
}
