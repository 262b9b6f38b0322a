use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Catalog rows for one hash as `(total, active)`
fn count_records(server_data_dir: &Path, hash: &str) -> Result<(usize, usize)> {
    let catalog_file = server_data_dir.join("catalog.json");
    let content = fs::read_to_string(&catalog_file)
        .with_context(|| format!("Failed to read catalog: {:?}", catalog_file))?;
    let catalog: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse catalog JSON")?;

    let records = catalog
        .get("records")
        .and_then(|v| v.as_array())
        .context("Invalid catalog format: missing records array")?;

    let rows: Vec<&serde_json::Value> = records
        .iter()
        .filter(|r| r.get("hash").and_then(|h| h.as_str()) == Some(hash))
        .collect();
    let active = rows
        .iter()
        .filter(|r| r.get("deleted_at").map_or(true, |d| d.is_null()))
        .count();
    Ok((rows.len(), active))
}

pub fn validate_records(
    server_data_dir: &Path,
    hash: &str,
    expected_total: usize,
    expected_active: usize,
) -> Result<()> {
    let (total, active) = count_records(server_data_dir, hash)?;
    if total != expected_total || active != expected_active {
        anyhow::bail!(
            "Hash {}: expected {} rows ({} active), found {} ({} active)",
            hash,
            expected_total,
            expected_active,
            total,
            active
        );
    }
    println!("  ✓ {} has {} rows, {} active", hash, total, active);
    Ok(())
}

/// Check the blob file exists (or not) and, when present, holds `expected` bytes
pub fn validate_blob(server_data_dir: &Path, hash: &str, expected: Option<&[u8]>) -> Result<()> {
    let blob_path = server_data_dir.join("blobs").join(hash);
    match expected {
        Some(content) => {
            let stored = fs::read(&blob_path)
                .with_context(|| format!("Blob does not exist: {:?}", blob_path))?;
            if stored != content {
                anyhow::bail!("Blob {} content differs from the uploaded file", hash);
            }
            println!("  ✓ Blob {} stored ({} bytes)", hash, stored.len());
        }
        None => {
            if blob_path.exists() {
                anyhow::bail!("Blob should not exist: {:?}", blob_path);
            }
            println!("  ✓ Blob {} absent", hash);
        }
    }
    Ok(())
}

/// Remove a blob behind the server's back, leaving its record as a catalog orphan
pub fn remove_blob(server_data_dir: &Path, hash: &str) -> Result<()> {
    let blob_path = server_data_dir.join("blobs").join(hash);
    fs::remove_file(&blob_path).with_context(|| format!("Failed to remove blob: {:?}", blob_path))
}

/// Write a blob with no catalog record
pub fn plant_blob(server_data_dir: &Path, hash: &str, content: &[u8]) -> Result<()> {
    let blob_path = server_data_dir.join("blobs").join(hash);
    fs::write(&blob_path, content).with_context(|| format!("Failed to write blob: {:?}", blob_path))
}

pub fn validate_downloaded_file(downloaded: &Path, original: &Path) -> Result<()> {
    let downloaded_content = fs::read(downloaded)
        .with_context(|| format!("Failed to read downloaded file: {:?}", downloaded))?;
    let original_content = fs::read(original)
        .with_context(|| format!("Failed to read original file: {:?}", original))?;

    if downloaded_content != original_content {
        anyhow::bail!(
            "Downloaded file differs from original ({} vs {} bytes)",
            downloaded_content.len(),
            original_content.len()
        );
    }
    println!("  ✓ Downloaded file matches original ({} bytes)", original_content.len());
    Ok(())
}
