use crate::ContentRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::TrackMetadata;
use crypto::ContentHash;
use sqlx::PgPool;

/// Column list shared by every record query, in `RecordRow` order
const RECORD_COLUMNS: &str =
    "hash, filename, title, artist, album, duration, created_at, updated_at, deleted_at";

type RecordRow = (
    String,
    String,
    String,
    String,
    String,
    i32,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn into_record(row: RecordRow) -> Result<ContentRecord> {
    let (hash, filename, title, artist, album, duration, created_at, updated_at, deleted_at) = row;
    let hash = ContentHash::parse(&hash)
        .with_context(|| format!("Corrupt hash in content_records: {:?}", hash))?;
    Ok(ContentRecord {
        hash,
        metadata: TrackMetadata {
            filename,
            title,
            artist,
            album,
            duration,
        },
        created_at,
        updated_at,
        deleted_at,
    })
}

/// Query operations for the catalog table
pub struct Queries;

impl Queries {
    /// Insert a new active record, or update the active one in place.
    /// The conflict target names the partial index, so tombstoned rows are never matched.
    pub async fn upsert_record(
        pool: &PgPool,
        hash: &ContentHash,
        metadata: &TrackMetadata,
    ) -> Result<ContentRecord> {
        let sql = format!(
            "INSERT INTO content_records (hash, filename, title, artist, album, duration)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (hash) WHERE deleted_at IS NULL DO UPDATE SET
                filename = EXCLUDED.filename,
                title = EXCLUDED.title,
                artist = EXCLUDED.artist,
                album = EXCLUDED.album,
                duration = EXCLUDED.duration,
                updated_at = NOW()
             RETURNING {}",
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(hash.as_str())
            .bind(&metadata.filename)
            .bind(&metadata.title)
            .bind(&metadata.artist)
            .bind(&metadata.album)
            .bind(metadata.duration)
            .fetch_one(pool)
            .await
            .context("Failed to upsert content record")?;
        into_record(row)
    }

    /// Load the active record for a hash
    pub async fn find_active(pool: &PgPool, hash: &ContentHash) -> Result<Option<ContentRecord>> {
        let sql = format!(
            "SELECT {} FROM content_records WHERE hash = $1 AND deleted_at IS NULL",
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(hash.as_str())
            .fetch_optional(pool)
            .await
            .context("Failed to query content record")?;
        row.map(into_record).transpose()
    }

    /// Tombstone the active record; returns the number of rows affected (0 or 1)
    pub async fn tombstone(pool: &PgPool, hash: &ContentHash) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE content_records SET deleted_at = NOW(), updated_at = NOW()
             WHERE hash = $1 AND deleted_at IS NULL",
        )
        .bind(hash.as_str())
        .execute(pool)
        .await
        .context("Failed to tombstone content record")?;
        Ok(result.rows_affected())
    }

    /// Load all active records
    pub async fn list_active(pool: &PgPool) -> Result<Vec<ContentRecord>> {
        let sql = format!(
            "SELECT {} FROM content_records WHERE deleted_at IS NULL ORDER BY hash",
            RECORD_COLUMNS
        );
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .fetch_all(pool)
            .await
            .context("Failed to list content records")?;
        rows.into_iter().map(into_record).collect()
    }

    /// Load hashes of all active records
    pub async fn list_active_hashes(pool: &PgPool) -> Result<Vec<ContentHash>> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT hash FROM content_records WHERE deleted_at IS NULL ORDER BY hash",
        )
        .fetch_all(pool)
        .await
        .context("Failed to list content hashes")?;

        rows.into_iter()
            .map(|(hash,)| {
                ContentHash::parse(&hash)
                    .with_context(|| format!("Corrupt hash in content_records: {:?}", hash))
            })
            .collect()
    }
}
