use anyhow::{Context, Result};
use sqlx::PgPool;

pub async fn connect(database_url: &str) -> Result<PgPool> {
    PgPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Check the row counts for one hash: total rows including tombstones, and active rows
pub async fn validate_records(
    pool: &PgPool,
    hash: &str,
    expected_total: i64,
    expected_active: i64,
) -> Result<()> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_records WHERE hash = $1")
        .bind(hash)
        .fetch_one(pool)
        .await
        .context("Failed to count records")?;
    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM content_records WHERE hash = $1 AND deleted_at IS NULL",
    )
    .bind(hash)
    .fetch_one(pool)
    .await
    .context("Failed to count active records")?;

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

/// Title of the active record, used to check that re-upload overwrites in place
pub async fn active_title(pool: &PgPool, hash: &str) -> Result<String> {
    sqlx::query_scalar("SELECT title FROM content_records WHERE hash = $1 AND deleted_at IS NULL")
        .bind(hash)
        .fetch_one(pool)
        .await
        .with_context(|| format!("No active record for {}", hash))
}

/// Insert an active record with no blob behind it
pub async fn insert_orphan_record(pool: &PgPool, hash: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO content_records (hash, filename, created_at, updated_at)
         VALUES ($1, 'orphan.mp3', NOW(), NOW())",
    )
    .bind(hash)
    .execute(pool)
    .await
    .context("Failed to insert orphan record")?;
    println!("  ✓ Inserted catalog orphan {}", hash);
    Ok(())
}

/// Clean up test data from database
pub async fn cleanup_test_data(database_url: &str, hashes: &[String]) -> Result<()> {
    let keep_data = std::env::var("KEEP_TEST_DATA").unwrap_or_else(|_| "false".to_string());
    if keep_data == "true" {
        println!("⚠️  Keeping database test data (KEEP_TEST_DATA=true)");
        return Ok(());
    }

    let pool = connect(database_url).await?;
    println!("🧹 Cleaning up database test data...");

    let removed = sqlx::query("DELETE FROM content_records WHERE hash = ANY($1)")
        .bind(hashes)
        .execute(&pool)
        .await
        .context("Failed to delete test records")?
        .rows_affected();

    println!("✅ Removed {} catalog rows", removed);
    Ok(())
}
