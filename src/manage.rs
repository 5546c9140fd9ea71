//! `docdb create` and `docdb grant`.

use anyhow::Result;

use docdb_core::lifecycle::{self, Grantee};
use docdb_core::naming;
use docdb_core::store::CollectionStore;
use docdb_core::{AccessRole, AdminConfig, ChatSession};

/// Create a collection in the session user's namespace.
pub async fn run_create(
    store: &dyn CollectionStore,
    session: &ChatSession,
    name: &str,
) -> Result<()> {
    let full = lifecycle::create_collection(session, store, name).await?;
    println!("Created collection `{}` ({})", name, full);
    Ok(())
}

/// Grant `role` on `collection` to a user or an access code.
///
/// `collection` may be a shown name of the caller's own collection or a
/// canonical name.
pub async fn run_grant(
    store: &dyn CollectionStore,
    session: &mut ChatSession,
    admin: &AdminConfig,
    collection: &str,
    grantee: Grantee,
    role: AccessRole,
) -> Result<()> {
    let full = if store.collection_exists(collection).await? {
        collection.to_string()
    } else {
        naming::canonical_name(session.user_id(), collection)
    };
    lifecycle::grant_role(session, store, admin, &full, &grantee, role).await?;
    match grantee {
        Grantee::User(user) => println!("Granted {} on `{}` to user {}", role, collection, user),
        Grantee::AccessCode(_) => {
            println!("Granted {} on `{}` to the access code", role, collection)
        }
    }
    Ok(())
}
