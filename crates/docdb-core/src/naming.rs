//! Collection naming.
//!
//! Every collection is stored under a canonical name. Private collections
//! embed the last [`USER_ID_SUFFIX_LENGTH`] characters of their native
//! owner's user id:
//!
//! ```text
//! u-abc123-my-notes
//! ^^                 PRIVATE_COLLECTION_PREFIX
//!   ^^^^^^           owner suffix (USER_ID_SUFFIX_LENGTH chars)
//!          ^^^^^^^^  user-facing name
//! ```
//!
//! Older collections were created without the separator dash
//! (`u-abc123my-notes`); parsing tolerates both forms.

use std::fmt;

/// Canonical name of the well-known public collection every user can view.
pub const DEFAULT_COLLECTION_NAME: &str = "docdocgo-documentation";

/// Prefix marking a private collection.
pub const PRIVATE_COLLECTION_PREFIX: &str = "u-";

/// Number of trailing user-id characters embedded in a private name.
pub const USER_ID_SUFFIX_LENGTH: usize = 6;

/// Length of `<prefix><owner suffix>`, in characters.
pub const PRIVATE_COLLECTION_FULL_PREFIX_LENGTH: usize =
    PRIVATE_COLLECTION_PREFIX.len() + USER_ID_SUFFIX_LENGTH;

/// The kind of a canonical collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// The well-known default collection.
    Default,
    /// Any name without the private prefix.
    Public,
    /// A name in some user's private namespace.
    Private,
}

/// Classify a canonical name.
pub fn classify(canonical: &str) -> CollectionKind {
    if canonical == DEFAULT_COLLECTION_NAME {
        CollectionKind::Default
    } else if is_private(canonical) {
        CollectionKind::Private
    } else {
        CollectionKind::Public
    }
}

pub fn is_private(canonical: &str) -> bool {
    canonical.starts_with(PRIVATE_COLLECTION_PREFIX)
}

/// A parsed private collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateName {
    owner_suffix: String,
    name: String,
}

impl PrivateName {
    /// Build a private name for `user_id`'s namespace.
    ///
    /// Returns `None` if the user id is shorter than
    /// [`USER_ID_SUFFIX_LENGTH`].
    pub fn new(user_id: &str, name: &str) -> Option<Self> {
        Some(Self {
            owner_suffix: user_id_suffix(user_id)?.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse a canonical name into its owner suffix and user-facing part.
    ///
    /// Returns `None` for public names and for private-prefixed names too
    /// short to carry a full owner suffix.
    pub fn parse(canonical: &str) -> Option<Self> {
        let rest = canonical.strip_prefix(PRIVATE_COLLECTION_PREFIX)?;
        let split = rest
            .char_indices()
            .nth(USER_ID_SUFFIX_LENGTH)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (owner_suffix, tail) = rest.split_at(split);
        if owner_suffix.chars().count() < USER_ID_SUFFIX_LENGTH {
            return None;
        }
        Some(Self {
            owner_suffix: owner_suffix.to_string(),
            name: tail.trim_start_matches('-').to_string(),
        })
    }

    /// Format as a canonical name (always with the separator dash).
    pub fn format(&self) -> String {
        self.to_string()
    }

    pub fn owner_suffix(&self) -> &str {
        &self.owner_suffix
    }

    /// The user-facing part of the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same namespace, different user-facing name.
    pub fn with_name(&self, name: &str) -> Self {
        Self {
            owner_suffix: self.owner_suffix.clone(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for PrivateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}",
            PRIVATE_COLLECTION_PREFIX, self.owner_suffix, self.name
        )
    }
}

/// The last [`USER_ID_SUFFIX_LENGTH`] characters of a user id.
pub fn user_id_suffix(user_id: &str) -> Option<&str> {
    let count = user_id.chars().count();
    if count < USER_ID_SUFFIX_LENGTH {
        return None;
    }
    let start = user_id
        .char_indices()
        .nth(count - USER_ID_SUFFIX_LENGTH)
        .map(|(i, _)| i)?;
    Some(&user_id[start..])
}

/// The owner suffix embedded in a private name, or `None` for public names.
pub fn native_owner(canonical: &str) -> Option<String> {
    PrivateName::parse(canonical).map(|p| p.owner_suffix)
}

/// Whether `user_id` is the native owner of `canonical`.
pub fn is_native_owner(user_id: Option<&str>, canonical: &str) -> bool {
    match (user_id.and_then(user_id_suffix), PrivateName::parse(canonical)) {
        (Some(suffix), Some(private)) => private.owner_suffix == suffix,
        _ => false,
    }
}

/// The name shown to `user_id` for `canonical`.
///
/// Only the native owner sees the short form; everyone else sees the full
/// canonical name so that two users' `notes` collections never collide.
pub fn user_facing_name(user_id: Option<&str>, canonical: &str) -> String {
    match PrivateName::parse(canonical) {
        Some(private) if is_native_owner(user_id, canonical) => private.name,
        _ => canonical.to_string(),
    }
}

/// The canonical name for `user_facing` in `user_id`'s namespace.
///
/// Without a user id (console mode) the name is used as is. A user id
/// shorter than the suffix length is used whole.
pub fn canonical_name(user_id: Option<&str>, user_facing: &str) -> String {
    match user_id {
        Some(id) => match PrivateName::new(id, user_facing) {
            Some(private) => private.format(),
            None => format!("{}{}-{}", PRIVATE_COLLECTION_PREFIX, id, user_facing),
        },
        None => user_facing.to_string(),
    }
}
