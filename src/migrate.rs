use anyhow::Result;
use docdb_core::naming::DEFAULT_COLLECTION_NAME;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Collections, keyed by canonical name
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            permissions_json TEXT NOT NULL DEFAULT '{}',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Documents are opaque to access control; renames cascade to them
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            source_id TEXT NOT NULL,
            body TEXT NOT NULL,
            dedup_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(collection, source_id),
            FOREIGN KEY (collection) REFERENCES collections(name)
                ON UPDATE CASCADE ON DELETE CASCADE
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)")
        .execute(&pool)
        .await?;

    // The default collection always exists
    sqlx::query(
        "INSERT OR IGNORE INTO collections (name, permissions_json, created_at) \
         VALUES (?, '{}', ?)",
    )
    .bind(DEFAULT_COLLECTION_NAME)
    .bind(chrono::Utc::now().timestamp())
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
