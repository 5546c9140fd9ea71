//! In-memory [`CollectionStore`] implementation for testing.
//!
//! Collections live in a `Vec` behind `std::sync::RwLock`, so listing keeps
//! insertion order the way a real store lists in creation order.

use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::permissions::CollectionPermissions;

use super::{CollectionInfo, CollectionStore};

struct StoredCollection {
    info: CollectionInfo,
    permissions: CollectionPermissions,
}

/// In-memory store for tests.
pub struct InMemoryStore {
    collections: RwLock<Vec<StoredCollection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(Vec::new()),
        }
    }

    /// A store pre-populated with empty collections.
    pub fn with_collections<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let store = Self::new();
        {
            let mut collections = store.collections.write().unwrap();
            for name in names {
                collections.push(StoredCollection {
                    info: CollectionInfo {
                        name: name.to_string(),
                        document_count: 0,
                        created_at: chrono::Utc::now().timestamp(),
                    },
                    permissions: CollectionPermissions::default(),
                });
            }
        }
        store
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionStore for InMemoryStore {
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let collections = self.collections.read().unwrap();
        Ok(collections.iter().map(|c| c.info.clone()).collect())
    }

    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        if collections.iter().any(|c| c.info.name == name) {
            bail!("Collection {} already exists", name);
        }
        collections.push(StoredCollection {
            info: CollectionInfo {
                name: name.to_string(),
                document_count: 0,
                created_at: chrono::Utc::now().timestamp(),
            },
            permissions: CollectionPermissions::default(),
        });
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        let before = collections.len();
        collections.retain(|c| c.info.name != name);
        if collections.len() == before {
            bail!("Collection {} does not exist", name);
        }
        Ok(())
    }

    async fn rename_collection(&self, name: &str, new_name: &str) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        if collections.iter().any(|c| c.info.name == new_name) {
            bail!("Collection {} already exists", new_name);
        }
        let stored = collections
            .iter_mut()
            .find(|c| c.info.name == name)
            .ok_or_else(|| anyhow!("Collection {} does not exist", name))?;
        stored.info.name = new_name.to_string();
        Ok(())
    }

    async fn get_permissions(&self, name: &str) -> Result<CollectionPermissions> {
        let collections = self.collections.read().unwrap();
        collections
            .iter()
            .find(|c| c.info.name == name)
            .map(|c| c.permissions.clone())
            .ok_or_else(|| anyhow!("Collection {} does not exist", name))
    }

    async fn save_permissions(
        &self,
        name: &str,
        permissions: &CollectionPermissions,
    ) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        let stored = collections
            .iter_mut()
            .find(|c| c.info.name == name)
            .ok_or_else(|| anyhow!("Collection {} does not exist", name))?;
        stored.permissions = permissions.clone();
        Ok(())
    }
}
