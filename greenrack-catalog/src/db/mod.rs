//! Database access layer for greenrack-catalog
//!
//! SQLite via sqlx. Foreign keys are enabled on every connection so that
//! deleting a repository image cascades to its matching rules.

use greenrack_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

mod repository;
pub use repository::RepositoryStore;

/// Connect to the catalog database, creating the file if missing.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;
    info!("Connected to catalog database at {}", db_path.display());
    Ok(pool)
}

/// In-memory pool for tests. Limited to one connection so every query sees
/// the same database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create the schema if it does not exist yet. Safe to run on every startup.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS repository_images (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            file_name  TEXT NOT NULL,
            mime_type  TEXT NOT NULL,
            image_data BLOB NOT NULL,
            group_name TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matching_rules (
            id                    INTEGER PRIMARY KEY AUTOINCREMENT,
            image_id              INTEGER NOT NULL REFERENCES repository_images(id) ON DELETE CASCADE,
            brand_name            TEXT,
            category              TEXT,
            strain                TEXT,
            strain_type           TEXT,
            product_name_keywords TEXT,
            priority              INTEGER NOT NULL DEFAULT 0,
            created_at            TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_rules_image_id ON matching_rules(image_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_rules_brand ON matching_rules(brand_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_rules_category ON matching_rules(category)")
        .execute(pool)
        .await?;

    Ok(())
}
