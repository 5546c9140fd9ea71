//! SQLite-backed [`CollectionStore`] implementation.
//!
//! Collections live in the `collections` table with their permission
//! metadata as JSON. Documents reference their collection by canonical name
//! with `ON UPDATE CASCADE ON DELETE CASCADE`, so renames and deletes carry
//! the documents along inside one statement.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use docdb_core::permissions::CollectionPermissions;
use docdb_core::store::{CollectionInfo, CollectionStore};

/// SQLite implementation of the [`CollectionStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CollectionStore for SqliteStore {
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT c.name, c.created_at, COUNT(d.id) AS document_count
            FROM collections c
            LEFT JOIN documents d ON d.collection = c.name
            GROUP BY c.name, c.created_at
            ORDER BY c.created_at ASC, c.rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CollectionInfo {
                name: row.get("name"),
                document_count: row.get("document_count"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn create_collection(&self, name: &str) -> Result<()> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO collections (name, permissions_json, created_at) \
             VALUES (?, '{}', ?)",
        )
        .bind(name)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("Collection {} already exists", name);
        }
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            bail!("Collection {} does not exist", name);
        }
        Ok(())
    }

    async fn rename_collection(&self, name: &str, new_name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let taken: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM collections WHERE name = ?")
            .bind(new_name)
            .fetch_one(&mut *tx)
            .await?;
        if taken {
            bail!("Collection {} already exists", new_name);
        }

        let result = sqlx::query("UPDATE collections SET name = ? WHERE name = ?")
            .bind(new_name)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            bail!("Collection {} does not exist", name);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_permissions(&self, name: &str) -> Result<CollectionPermissions> {
        let json: Option<String> =
            sqlx::query_scalar("SELECT permissions_json FROM collections WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        match json {
            Some(json) => CollectionPermissions::from_json(&json)
                .with_context(|| format!("Invalid permissions for collection {}", name)),
            None => bail!("Collection {} does not exist", name),
        }
    }

    async fn save_permissions(
        &self,
        name: &str,
        permissions: &CollectionPermissions,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE collections SET permissions_json = ? WHERE name = ?")
            .bind(permissions.to_json()?)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            bail!("Collection {} does not exist", name);
        }
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM collections WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
