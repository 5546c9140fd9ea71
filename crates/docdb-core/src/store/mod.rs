//! Storage abstraction for docdb.
//!
//! The [`CollectionStore`] trait is everything the access-control and
//! command logic needs from a backend: listing, creating, renaming, and
//! deleting collections, and reading and writing their permission metadata.
//!
//! The store is shared between sessions and is responsible for serializing
//! its own writes. Implementations must be `Send + Sync`.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::permissions::CollectionPermissions;

/// Summary of a stored collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    /// Canonical name.
    pub name: String,
    pub document_count: i64,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

/// Abstract collection backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_collections`](CollectionStore::list_collections) | All collections, in store order |
/// | [`create_collection`](CollectionStore::create_collection) | Create an empty collection |
/// | [`delete_collection`](CollectionStore::delete_collection) | Delete with its documents |
/// | [`rename_collection`](CollectionStore::rename_collection) | Rename, keeping documents |
/// | [`get_permissions`](CollectionStore::get_permissions) | Read permission metadata |
/// | [`save_permissions`](CollectionStore::save_permissions) | Replace permission metadata |
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Create an empty collection. Fails if the name is taken.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Delete a collection. Fails if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Rename a collection. Fails if `name` does not exist or `new_name`
    /// is taken.
    async fn rename_collection(&self, name: &str, new_name: &str) -> Result<()>;

    /// Permission metadata of a collection. Fails if it does not exist.
    async fn get_permissions(&self, name: &str) -> Result<CollectionPermissions>;

    async fn save_permissions(&self, name: &str, permissions: &CollectionPermissions)
        -> Result<()>;

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .list_collections()
            .await?
            .iter()
            .any(|c| c.name == name))
    }
}
