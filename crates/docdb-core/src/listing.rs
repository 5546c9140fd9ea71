//! Visible collections, as shown to one user.
//!
//! A user sees public collections, their own private collections, and the
//! default collection. The listing puts the default collection first and
//! sorts the rest by user-facing name (byte order, so case-sensitive).
//! Positions in the listing are what `/db use 3` and `/db delete 2,4` refer to.

use crate::error::DbCommandError;
use crate::naming::{self, DEFAULT_COLLECTION_NAME};
use crate::store::CollectionInfo;

/// One row of a [`CollectionListing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedCollection {
    /// Name as shown to the user.
    pub shown: String,
    /// Canonical name.
    pub full: String,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionListing {
    entries: Vec<ListedCollection>,
}

/// Whether `canonical` is visible to `user_id`.
///
/// Anonymous (console) users see only public collections.
pub fn is_visible(user_id: Option<&str>, canonical: &str) -> bool {
    !naming::is_private(canonical)
        || (user_id.is_some() && naming::is_native_owner(user_id, canonical))
}

impl CollectionListing {
    /// Build the sorted listing of `collections` visible to `user_id`.
    pub fn for_user(
        user_id: Option<&str>,
        collections: &[CollectionInfo],
    ) -> Result<Self, DbCommandError> {
        if let Some(id) = user_id {
            if naming::user_id_suffix(id).is_none() {
                return Err(DbCommandError::InvalidUserId(id.to_string()));
            }
        }
        let entries = collections
            .iter()
            .filter(|c| is_visible(user_id, &c.name))
            .map(|c| ListedCollection {
                shown: naming::user_facing_name(user_id, &c.name),
                full: c.name.clone(),
            })
            .collect();
        Ok(Self::sorted(entries))
    }

    /// Sort so the default collection comes first, then by shown name.
    pub fn sorted(mut entries: Vec<ListedCollection>) -> Self {
        entries.sort_by(|a, b| {
            (a.full != DEFAULT_COLLECTION_NAME, &a.shown)
                .cmp(&(b.full != DEFAULT_COLLECTION_NAME, &b.shown))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[ListedCollection] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Zero-based position of the entry shown as `shown`.
    pub fn position_of_shown(&self, shown: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.shown == shown)
    }

    pub fn get(&self, idx: usize) -> Option<&ListedCollection> {
        self.entries.get(idx)
    }

    /// `1. name` lines, one per entry.
    pub fn numbered(&self) -> String {
        numbered(self.entries.iter().map(|e| e.shown.as_str()))
    }

    /// The "Available collections" block used in answers.
    pub fn available_str(&self) -> String {
        format!("Available collections:\n\n{}", self.numbered())
    }
}

pub fn numbered<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .enumerate()
        .map(|(i, n)| format!("{}. {}", i + 1, n))
        .collect::<Vec<_>>()
        .join("\n")
}
