//! Access role resolution.
//!
//! Two entry points with deliberately different freshness:
//!
//! - [`get_access_role`] answers "what may this user do here" and trusts the
//!   session cache when no access code is being tried.
//! - [`is_user_authorized_for_collection`] answers "may this user edit here"
//!   and always reads the collection's current metadata.
//!
//! Resolution order for [`get_access_role`]:
//!
//! ```text
//! default collection ──▶ OWNER with admin password, else VIEWER
//! public name        ──▶ OWNER
//! own private name   ──▶ OWNER
//! cached role, no code ──▶ cached role
//! otherwise          ──▶ max(code role, user role, cached role), cache ratchets up
//! ```

use anyhow::Result;
use tracing::debug;

use crate::naming::{self, CollectionKind};
use crate::role::AccessRole;
use crate::session::{AdminConfig, ChatSession};
use crate::store::CollectionStore;

/// Highest role the session's user holds for `collection` (the active
/// collection if `None`), optionally presenting `access_code`.
///
/// Never returns less than the role cached for the same collection and user,
/// and only fetches permission metadata when the cheap checks are not enough.
pub async fn get_access_role(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    collection: Option<&str>,
    access_code: Option<&str>,
) -> Result<AccessRole> {
    let collection = collection
        .unwrap_or(session.active_collection())
        .to_string();

    match naming::classify(&collection) {
        CollectionKind::Default => {
            return Ok(if admin.matches(access_code) {
                AccessRole::Owner
            } else {
                AccessRole::Viewer
            });
        }
        CollectionKind::Public => return Ok(AccessRole::Owner),
        CollectionKind::Private => {}
    }

    if naming::is_native_owner(session.user_id(), &collection) {
        return Ok(AccessRole::Owner);
    }

    let cached = session.role_cache.get(&collection, session.user_id());
    if cached != AccessRole::None && access_code.is_none() {
        return Ok(cached);
    }

    debug!(collection = %collection, "fetching collection permissions");
    let permissions = store.get_permissions(&collection).await?;
    let role = permissions
        .access_code_role(access_code)
        .max(permissions.user_role(session.user_id()))
        .max(cached);

    let user_id = session.user_id.clone();
    if session
        .role_cache
        .ratchet(&collection, user_id.as_deref(), role)
    {
        debug!(collection = %collection, role = %role, "cached access role");
    }

    Ok(role)
}

/// Whether the session's user may edit `collection` (the active collection
/// if `None`).
///
/// Public and natively owned collections always pass. Otherwise EDITOR or
/// above is required from the user's settings or from `access_code`, read
/// from current metadata. The session cache is not consulted.
pub async fn is_user_authorized_for_collection(
    session: &ChatSession,
    store: &dyn CollectionStore,
    collection: Option<&str>,
    access_code: Option<&str>,
) -> Result<bool> {
    let collection = collection.unwrap_or(session.active_collection());

    if !naming::is_private(collection) {
        return Ok(true);
    }

    if naming::is_native_owner(session.user_id(), collection) {
        return Ok(true);
    }

    debug!(collection = %collection, "checking collection permissions");
    let permissions = store.get_permissions(collection).await?;
    Ok(permissions.user_role(session.user_id()) >= AccessRole::Editor
        || permissions.access_code_role(access_code) >= AccessRole::Editor)
}
