//! Adding documents to a collection.
//!
//! Documents are opaque to access control: they are stored whole, keyed by
//! their path within the collection, and move with the collection on rename.
//! Writing requires editor rights on the target collection; the default
//! collection only accepts documents from an admin.

use anyhow::{bail, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use docdb_core::access::is_user_authorized_for_collection;
use docdb_core::naming::{self, DEFAULT_COLLECTION_NAME};
use docdb_core::store::CollectionStore;
use docdb_core::{AdminConfig, ChatSession};

use crate::sqlite_store::SqliteStore;

/// A file ready to be stored.
#[derive(Debug, Clone)]
pub struct PendingDocument {
    pub source_id: String,
    pub body: String,
    pub dedup_hash: String,
}

/// Collect UTF-8 files under `paths` (files or directories), sorted by path.
pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PendingDocument>> {
    let mut docs = Vec::new();
    for root in paths {
        if !root.exists() {
            bail!("Path does not exist: {}", root.display());
        }
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(doc) = read_document(entry.path())? {
                docs.push(doc);
            }
        }
    }
    docs.sort_by(|a, b| a.source_id.cmp(&b.source_id));
    docs.dedup_by(|a, b| a.source_id == b.source_id);
    Ok(docs)
}

fn read_document(path: &Path) -> Result<Option<PendingDocument>> {
    let body = match std::fs::read_to_string(path) {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            warn!(path = %path.display(), "skipping non-UTF-8 file");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    Ok(Some(PendingDocument {
        source_id: path.to_string_lossy().to_string(),
        body,
        dedup_hash: format!("{:x}", hasher.finalize()),
    }))
}

/// Upsert `docs` into `collection`. Returns the number of new or changed
/// documents.
pub async fn store_documents(
    store: &SqliteStore,
    collection: &str,
    docs: &[PendingDocument],
) -> Result<usize> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = store.pool().begin().await?;
    let mut changed = 0;

    for doc in docs {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (id, collection, source_id, body, dedup_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(collection, source_id) DO UPDATE SET
                body = excluded.body,
                dedup_hash = excluded.dedup_hash
            WHERE documents.dedup_hash != excluded.dedup_hash
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(collection)
        .bind(&doc.source_id)
        .bind(&doc.body)
        .bind(&doc.dedup_hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        changed += result.rows_affected() as usize;
    }

    tx.commit().await?;
    Ok(changed)
}

/// `docdb add`: add files to the session's active collection.
pub async fn run_add(
    store: &SqliteStore,
    session: &ChatSession,
    admin: &AdminConfig,
    access_code: Option<&str>,
    paths: &[PathBuf],
) -> Result<()> {
    let collection = session.active_collection();
    if !store.collection_exists(collection).await? {
        bail!("Collection {} does not exist", collection);
    }

    let authorized = if collection == DEFAULT_COLLECTION_NAME {
        admin.matches(access_code)
    } else {
        is_user_authorized_for_collection(session, store, None, access_code).await?
    };
    if !authorized {
        bail!(
            "You don't have editor access to collection {}",
            naming::user_facing_name(session.user_id(), collection)
        );
    }

    let docs = collect_documents(paths)?;
    let changed = store_documents(store, collection, &docs).await?;
    info!(collection = %collection, scanned = docs.len(), changed, "added documents");

    println!("collection: {}", naming::user_facing_name(session.user_id(), collection));
    println!("scanned files: {}", docs.len());
    println!("upserted documents: {}", changed);
    println!("ok");
    Ok(())
}
