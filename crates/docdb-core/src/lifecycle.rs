//! Collection lifecycle: create, rename, delete, and share.
//!
//! Renaming keeps a private collection in its native owner's namespace, no
//! matter who renames it, and re-grants OWNER to the native owner when
//! someone else did the renaming.

use tracing::{info, warn};

use crate::access::{get_access_role, is_user_authorized_for_collection};
use crate::error::{DbCommandError, StoreResultExt};
use crate::naming::{
    self, PrivateName, DEFAULT_COLLECTION_NAME, PRIVATE_COLLECTION_PREFIX,
};
use crate::permissions::{AccessCodeSettings, CollectionUserSettings};
use crate::role::AccessRole;
use crate::session::{AdminConfig, ChatSession};
use crate::store::CollectionStore;

/// Result of a successful rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    /// Name as the user typed it (or the default name for the admin directive).
    pub shown: String,
    /// New canonical name.
    pub full: String,
    /// Native owner whose OWNER role was re-granted, if any.
    pub restored_owner: Option<String>,
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Deleted collections, as shown to the user.
    pub shown: Vec<String>,
    /// Whether the active collection was deleted and the session fell back
    /// to the default collection.
    pub switched_to_default: bool,
}

fn validate_new_name(name: &str) -> Result<(), DbCommandError> {
    if name.trim().is_empty() {
        return Err(DbCommandError::invalid("A collection name cannot be empty."));
    }
    if name.starts_with('-') {
        return Err(DbCommandError::invalid(format!(
            "`{}` is not a valid collection name.",
            name
        )));
    }
    Ok(())
}

/// Rename the session's active collection to `value`.
///
/// `value` is a user-facing name, or `--default <admin-password>` to
/// replace the default collection with the active one. On success the
/// session switches to the new canonical name.
pub async fn rename_active_collection(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    value: &str,
) -> Result<RenameOutcome, DbCommandError> {
    let current = session.active_collection().to_string();
    if current == DEFAULT_COLLECTION_NAME {
        return Err(DbCommandError::forbidden(
            "You cannot rename the default collection.",
        ));
    }

    let native_owner = naming::native_owner(&current);

    let (shown, new_full) = if admin.is_default_directive(value) {
        if store
            .collection_exists(DEFAULT_COLLECTION_NAME)
            .await
            .or_store_failure("Error renaming collection")?
        {
            warn!("admin is replacing the default collection");
            store
                .delete_collection(DEFAULT_COLLECTION_NAME)
                .await
                .or_store_failure("Error deleting the default collection")?;
        }
        (
            DEFAULT_COLLECTION_NAME.to_string(),
            DEFAULT_COLLECTION_NAME.to_string(),
        )
    } else {
        validate_new_name(value)?;
        let role = get_access_role(session, store, admin, None, None)
            .await
            .or_store_failure("Error checking access")?;
        if role < AccessRole::Owner {
            return Err(DbCommandError::forbidden(
                "You can't rename the current collection because you \
                 don't have owner access to it.",
            ));
        }
        if value == DEFAULT_COLLECTION_NAME {
            return Err(DbCommandError::forbidden(
                "Only an admin can rename a collection to the default collection's name.",
            ));
        }

        let new_full = match PrivateName::parse(&current) {
            Some(private) => private.with_name(value).format(),
            None if naming::is_private(&current) => {
                naming::canonical_name(session.user_id(), value)
            }
            None => {
                if value.starts_with(PRIVATE_COLLECTION_PREFIX) {
                    return Err(DbCommandError::forbidden(format!(
                        "A public collection's name cannot start with `{}`.",
                        PRIVATE_COLLECTION_PREFIX
                    )));
                }
                value.to_string()
            }
        };
        (value.to_string(), new_full)
    };

    store
        .rename_collection(&current, &new_full)
        .await
        .or_store_failure("Error renaming collection")?;
    info!(from = %current, to = %new_full, "renamed collection");

    let mut restored_owner = None;
    if let Some(owner) = native_owner {
        let acting_suffix = session.user_id().and_then(naming::user_id_suffix);
        if acting_suffix != Some(owner.as_str()) {
            let mut permissions = store
                .get_permissions(&new_full)
                .await
                .or_store_failure("Error restoring owner access")?;
            // Keyed by the owner suffix: the name carries no full user id.
            // The native owner's access still comes from the namespace match.
            permissions.set_user_settings(
                &owner,
                CollectionUserSettings::with_role(AccessRole::Owner),
            );
            store
                .save_permissions(&new_full, &permissions)
                .await
                .or_store_failure("Error restoring owner access")?;
            info!(owner = %owner, collection = %new_full, "restored owner access");
            restored_owner = Some(owner);
        }
    }

    session.switch_to(new_full.clone());
    Ok(RenameOutcome {
        shown,
        full: new_full,
        restored_owner,
    })
}

/// Delete `full_names` in order.
///
/// The default collection can only be among them through the admin
/// directive, which the caller has already checked. The session falls back
/// to the default collection as soon as the active collection is deleted,
/// even if a later delete fails.
pub async fn delete_collections(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    full_names: &[String],
) -> Result<DeleteOutcome, DbCommandError> {
    let mut switched_to_default = false;
    for full_name in full_names {
        store
            .delete_collection(full_name)
            .await
            .or_store_failure("Error deleting collection")?;
        info!(collection = %full_name, "deleted collection");

        if full_name == session.active_collection() {
            session.switch_to(DEFAULT_COLLECTION_NAME);
            switched_to_default = true;
        }
    }

    Ok(DeleteOutcome {
        shown: full_names
            .iter()
            .map(|n| naming::user_facing_name(session.user_id(), n))
            .collect(),
        switched_to_default,
    })
}

/// Create `name` in the session user's namespace (public in console mode).
///
/// Returns the canonical name.
pub async fn create_collection(
    session: &ChatSession,
    store: &dyn CollectionStore,
    name: &str,
) -> Result<String, DbCommandError> {
    validate_new_name(name)?;
    if session.user_id().is_none() && naming::is_private(name) {
        return Err(DbCommandError::forbidden(format!(
            "A public collection's name cannot start with `{}`.",
            PRIVATE_COLLECTION_PREFIX
        )));
    }
    let full = naming::canonical_name(session.user_id(), name);
    if full == DEFAULT_COLLECTION_NAME {
        return Err(DbCommandError::forbidden(
            "The default collection's name is reserved.",
        ));
    }
    store
        .create_collection(&full)
        .await
        .or_store_failure("Error creating collection")?;
    info!(collection = %full, "created collection");
    Ok(full)
}

/// Who a grant applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grantee {
    User(String),
    AccessCode(String),
}

/// Check that the session may grant `role` on `collection`.
///
/// Editors may share up to EDITOR; only owners may hand out OWNER.
async fn check_can_grant(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    collection: &str,
    role: AccessRole,
) -> Result<(), DbCommandError> {
    if collection == DEFAULT_COLLECTION_NAME {
        return Err(DbCommandError::forbidden(
            "Access to the default collection cannot be shared.",
        ));
    }
    let allowed = if role >= AccessRole::Owner {
        get_access_role(session, store, admin, Some(collection), None)
            .await
            .or_store_failure("Error checking access")?
            >= AccessRole::Owner
    } else {
        is_user_authorized_for_collection(session, store, Some(collection), None)
            .await
            .or_store_failure("Error checking access")?
    };
    if !allowed {
        return Err(DbCommandError::forbidden(format!(
            "You don't have sufficient access to share collection {}.",
            collection
        )));
    }
    Ok(())
}

/// Grant `role` on `collection` to a user or an access code.
pub async fn grant_role(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    collection: &str,
    grantee: &Grantee,
    role: AccessRole,
) -> Result<(), DbCommandError> {
    check_can_grant(session, store, admin, collection, role).await?;
    let mut permissions = store
        .get_permissions(collection)
        .await
        .or_store_failure("Error reading collection permissions")?;
    match grantee {
        Grantee::User(user_id) => {
            permissions.set_user_settings(user_id, CollectionUserSettings::with_role(role))
        }
        Grantee::AccessCode(code) => {
            permissions.set_access_code_settings(code, AccessCodeSettings::with_role(role))
        }
    }
    store
        .save_permissions(collection, &permissions)
        .await
        .or_store_failure("Error saving collection permissions")?;
    info!(collection = %collection, role = %role, "granted access");
    Ok(())
}
