//! `/db` command parsing and target resolution.
//!
//! Single-target commands (`use`) try, in order: an exact shown name, a
//! 1-based index into the listing, then a foreign canonical name the user
//! can at least view.
//!
//! Multi-target commands (`delete`) accept `-c`/`--current`, the admin
//! `--default <password>` directive, an exact shown name, an admin-gated
//! `<min>-<max> <password>` range, or a comma-separated index list. Index 1
//! (the default collection) is never a valid delete index. Anything else
//! falls back to a foreign canonical name the user owns.

use crate::access::get_access_role;
use crate::error::{DbCommandError, StoreResultExt};
use crate::listing::CollectionListing;
use crate::naming::DEFAULT_COLLECTION_NAME;
use crate::role::AccessRole;
use crate::session::{AdminConfig, ChatSession};
use crate::store::CollectionStore;

/// Prefix of collection-management commands in chat input.
pub const DB_COMMAND_PREFIX: &str = "/db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbCommand {
    /// `/db` with no recognized subcommand.
    None,
    List,
    Use,
    Rename,
    Delete,
}

impl DbCommand {
    fn from_subcommand(s: &str) -> Option<Self> {
        match s {
            "list" => Some(DbCommand::List),
            "use" => Some(DbCommand::Use),
            "rename" => Some(DbCommand::Rename),
            "delete" => Some(DbCommand::Delete),
            _ => None,
        }
    }
}

/// A parsed `/db` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDbCommand {
    pub command: DbCommand,
    /// Everything after the subcommand, trimmed.
    pub value: String,
}

impl ParsedDbCommand {
    pub fn new(command: DbCommand, value: impl Into<String>) -> Self {
        Self {
            command,
            value: value.into(),
        }
    }
}

/// Parse chat input. Returns `None` if it is not a `/db` command.
///
/// ```
/// use docdb_core::command::{parse_db_command, DbCommand};
///
/// let parsed = parse_db_command("/db use 3").unwrap();
/// assert_eq!(parsed.command, DbCommand::Use);
/// assert_eq!(parsed.value, "3");
/// assert!(parse_db_command("/dbx").is_none());
/// ```
pub fn parse_db_command(input: &str) -> Option<ParsedDbCommand> {
    let input = input.trim();
    let rest = input.strip_prefix(DB_COMMAND_PREFIX)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(parse_subcommand(rest))
}

/// Parse `<subcommand> <value>` (the part after `/db`).
pub fn parse_subcommand(input: &str) -> ParsedDbCommand {
    let input = input.trim();
    let (sub, value) = match input.split_once(char::is_whitespace) {
        Some((sub, value)) => (sub, value.trim()),
        None => (input, ""),
    };
    match DbCommand::from_subcommand(sub) {
        Some(command) => ParsedDbCommand::new(command, value),
        None => ParsedDbCommand::new(DbCommand::None, input),
    }
}

/// A resolved single target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Name to show the user.
    pub shown: String,
    /// Canonical name.
    pub full: String,
}

fn not_found(name: &str, listing: &CollectionListing) -> DbCommandError {
    DbCommandError::NotFoundOrUnauthorized {
        name: name.to_string(),
        available: listing.numbered(),
    }
}

/// Whether a foreign canonical name exists and grants at least `min_role`.
async fn foreign_has_role(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    value: &str,
    min_role: AccessRole,
) -> Result<bool, DbCommandError> {
    if !store
        .collection_exists(value)
        .await
        .or_store_failure("Error looking up collection")?
    {
        return Ok(false);
    }
    let role = get_access_role(session, store, admin, Some(value), None)
        .await
        .or_store_failure("Error checking access")?;
    Ok(role >= min_role)
}

/// Resolve the target of `/db use <value>`.
pub async fn resolve_single_target(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    listing: &CollectionListing,
    value: &str,
) -> Result<ResolvedTarget, DbCommandError> {
    if let Some(idx) = listing.position_of_shown(value) {
        let entry = &listing.entries()[idx];
        return Ok(ResolvedTarget {
            shown: entry.shown.clone(),
            full: entry.full.clone(),
        });
    }

    if let Ok(number) = value.trim().parse::<i64>() {
        return number
            .checked_sub(1)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| listing.get(idx))
            .map(|entry| ResolvedTarget {
                shown: entry.shown.clone(),
                full: entry.full.clone(),
            })
            .ok_or_else(|| {
                DbCommandError::invalid(format!(
                    "Collection number {} is out of range. {}",
                    number,
                    listing.available_str()
                ))
            });
    }

    if !foreign_has_role(session, store, admin, value, AccessRole::Viewer).await? {
        return Err(not_found(value, listing));
    }
    Ok(ResolvedTarget {
        shown: value.to_string(),
        full: value.to_string(),
    })
}

/// Parse `<min>-<max>` into zero-based listing indices.
fn parse_index_range(range: &str, listing_len: usize) -> Option<Vec<usize>> {
    let (left, right) = range.split_once('-')?;
    if right.contains('-') {
        return None;
    }
    let min_idx = left.trim().parse::<usize>().ok()?.checked_sub(1)?;
    let max_idx = right.trim().parse::<usize>().ok()?.checked_sub(1)?;
    if min_idx < 1 || max_idx >= listing_len {
        return None;
    }
    Some((min_idx..=max_idx).collect())
}

/// Parse `2, 4, 19` into zero-based listing indices, first occurrence
/// order, without repeats.
fn parse_index_list(list: &str, listing_len: usize) -> Option<Vec<usize>> {
    let mut idxs: Vec<usize> = Vec::new();
    for s in list.split(',') {
        let idx = s.trim().parse::<usize>().ok()?.checked_sub(1)?;
        if !(1..listing_len).contains(&idx) {
            return None;
        }
        if !idxs.contains(&idx) {
            idxs.push(idx);
        }
    }
    Some(idxs)
}

fn parse_indices(
    admin: &AdminConfig,
    value: &str,
    listing_len: usize,
) -> Option<Vec<usize>> {
    let idxs = if value.contains('-') {
        parse_index_range(admin.strip_password_suffix(value)?, listing_len)?
    } else {
        parse_index_list(value, listing_len)?
    };
    (!idxs.is_empty()).then_some(idxs)
}

/// Resolve the canonical names targeted by `/db delete <value>`.
pub async fn resolve_delete_targets(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    listing: &CollectionListing,
    value: &str,
) -> Result<Vec<String>, DbCommandError> {
    let cannot_delete_default =
        || DbCommandError::forbidden("You cannot delete the default collection.");

    if value == "-c" || value == "--current" {
        if session.active_collection() == DEFAULT_COLLECTION_NAME {
            return Err(cannot_delete_default());
        }
        return Ok(vec![session.active_collection().to_string()]);
    }

    if value == DEFAULT_COLLECTION_NAME {
        return Err(cannot_delete_default());
    }

    if admin.is_default_directive(value) {
        return Ok(vec![DEFAULT_COLLECTION_NAME.to_string()]);
    }

    // A user's own collection wins over a public one with the same shown name.
    if let Some(idx) = listing.position_of_shown(value) {
        return Ok(vec![listing.entries()[idx].full.clone()]);
    }

    // Indices win over a public collection literally named "3".
    if let Some(idxs) = parse_indices(admin, value, listing.len()) {
        return Ok(idxs
            .into_iter()
            .map(|idx| listing.entries()[idx].full.clone())
            .collect());
    }

    if !foreign_has_role(session, store, admin, value, AccessRole::Owner).await? {
        return Err(not_found(value, listing));
    }
    Ok(vec![value.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{CollectionPermissions, CollectionUserSettings};
    use crate::store::memory::InMemoryStore;

    const ALICE: &str = "alice-aaaaaa";
    const BOB: &str = "bob-bbbbbb";

    async fn setup() -> (InMemoryStore, ChatSession, CollectionListing) {
        let store = InMemoryStore::with_collections([
            "u-aaaaaa-beta",
            DEFAULT_COLLECTION_NAME,
            "u-aaaaaa-alpha",
            "u-bbbbbb-shared",
            "u-bbbbbb-viewable",
        ]);
        let mut perms = CollectionPermissions::default();
        perms.set_user_settings(ALICE, CollectionUserSettings::with_role(AccessRole::Owner));
        store.save_permissions("u-bbbbbb-shared", &perms).await.unwrap();
        let mut perms = CollectionPermissions::default();
        perms.set_user_settings(ALICE, CollectionUserSettings::with_role(AccessRole::Viewer));
        store.save_permissions("u-bbbbbb-viewable", &perms).await.unwrap();

        let session = ChatSession::with_default_collection(Some(ALICE.to_string()));
        let listing = CollectionListing::for_user(
            session.user_id(),
            &store.list_collections().await.unwrap(),
        )
        .unwrap();
        (store, session, listing)
    }

    fn admin() -> AdminConfig {
        AdminConfig::new(Some("pwd".into()))
    }

    #[test]
    fn test_parse_db_command() {
        let parsed = parse_db_command("/db delete 2, 4").unwrap();
        assert_eq!(parsed, ParsedDbCommand::new(DbCommand::Delete, "2, 4"));
        assert_eq!(parse_db_command("/db").unwrap().command, DbCommand::None);
        assert_eq!(parse_db_command("  /db list  ").unwrap().command, DbCommand::List);
        assert!(parse_db_command("/docs hello").is_none());
        assert!(parse_db_command("/dblist").is_none());
    }

    #[test]
    fn test_subcommands_are_case_sensitive() {
        let parsed = parse_subcommand("USE 3");
        assert_eq!(parsed.command, DbCommand::None);
        assert_eq!(parsed.value, "USE 3");
    }

    #[test]
    fn test_rename_value_keeps_inner_spaces() {
        let parsed = parse_subcommand("rename --default my pwd");
        assert_eq!(parsed.command, DbCommand::Rename);
        assert_eq!(parsed.value, "--default my pwd");
    }

    #[tokio::test]
    async fn test_use_by_name_and_index() {
        let (store, mut session, listing) = setup().await;
        let shown: Vec<&str> = listing.entries().iter().map(|e| e.shown.as_str()).collect();
        assert_eq!(shown, vec![DEFAULT_COLLECTION_NAME, "alpha", "beta"]);

        let target = resolve_single_target(&mut session, &store, &admin(), &listing, "beta")
            .await
            .unwrap();
        assert_eq!(target.full, "u-aaaaaa-beta");

        let target = resolve_single_target(&mut session, &store, &admin(), &listing, "2")
            .await
            .unwrap();
        assert_eq!(target.shown, "alpha");
        assert_eq!(target.full, "u-aaaaaa-alpha");
    }

    #[tokio::test]
    async fn test_use_index_out_of_range() {
        let (store, mut session, listing) = setup().await;
        for token in ["0", "4", "-1", "-9223372036854775808", "9223372036854775807"] {
            let err = resolve_single_target(&mut session, &store, &admin(), &listing, token)
                .await
                .unwrap_err();
            assert!(matches!(err, DbCommandError::InvalidToken(_)), "{}", token);
        }
    }

    #[tokio::test]
    async fn test_use_foreign_collection() {
        let (store, mut session, listing) = setup().await;
        let target =
            resolve_single_target(&mut session, &store, &admin(), &listing, "u-bbbbbb-viewable")
                .await
                .unwrap();
        assert_eq!(target.shown, "u-bbbbbb-viewable");

        let err = resolve_single_target(&mut session, &store, &admin(), &listing, "u-cccccc-nope")
            .await
            .unwrap_err();
        match err {
            DbCommandError::NotFoundOrUnauthorized { name, available } => {
                assert_eq!(name, "u-cccccc-nope");
                assert!(available.contains("2. alpha"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_use_with_wrong_default_directive_is_not_found() {
        let (store, mut session, listing) = setup().await;
        let err = resolve_single_target(&mut session, &store, &admin(), &listing, "--default nope")
            .await
            .unwrap_err();
        assert!(matches!(err, DbCommandError::NotFoundOrUnauthorized { .. }));
    }

    #[tokio::test]
    async fn test_delete_index_list() {
        let (store, mut session, listing) = setup().await;
        let names = resolve_delete_targets(&mut session, &store, &admin(), &listing, "2, 3")
            .await
            .unwrap();
        assert_eq!(names, vec!["u-aaaaaa-alpha", "u-aaaaaa-beta"]);

        let names = resolve_delete_targets(&mut session, &store, &admin(), &listing, "3, 2, 3")
            .await
            .unwrap();
        assert_eq!(names, vec!["u-aaaaaa-beta", "u-aaaaaa-alpha"]);
    }

    #[tokio::test]
    async fn test_delete_rejects_default_index() {
        let (store, mut session, listing) = setup().await;
        for token in ["1", "1,2", "4", ""] {
            let err = resolve_delete_targets(&mut session, &store, &admin(), &listing, token)
                .await
                .unwrap_err();
            assert!(
                matches!(err, DbCommandError::NotFoundOrUnauthorized { .. }),
                "{:?}",
                token
            );
        }
    }

    #[tokio::test]
    async fn test_delete_default_forbidden() {
        let (store, mut session, listing) = setup().await;
        let default = DEFAULT_COLLECTION_NAME;
        let err = resolve_delete_targets(&mut session, &store, &admin(), &listing, default)
            .await
            .unwrap_err();
        assert!(matches!(err, DbCommandError::ForbiddenOperation(_)));

        let err = resolve_delete_targets(&mut session, &store, &admin(), &listing, "-c")
            .await
            .unwrap_err();
        assert!(matches!(err, DbCommandError::ForbiddenOperation(_)));
    }

    #[tokio::test]
    async fn test_delete_current() {
        let (store, mut session, listing) = setup().await;
        session.switch_to("u-aaaaaa-beta");
        let names = resolve_delete_targets(&mut session, &store, &admin(), &listing, "--current")
            .await
            .unwrap();
        assert_eq!(names, vec!["u-aaaaaa-beta"]);
    }

    #[tokio::test]
    async fn test_delete_range_requires_admin_password() {
        let (store, mut session, listing) = setup().await;
        let names = resolve_delete_targets(&mut session, &store, &admin(), &listing, "2-3 pwd")
            .await
            .unwrap();
        assert_eq!(names, vec!["u-aaaaaa-alpha", "u-aaaaaa-beta"]);

        for token in ["2-3", "2-3 wrong", "1-3 pwd", "2-4 pwd"] {
            let err = resolve_delete_targets(&mut session, &store, &admin(), &listing, token)
                .await
                .unwrap_err();
            assert!(
                matches!(err, DbCommandError::NotFoundOrUnauthorized { .. }),
                "{:?}",
                token
            );
        }

        let no_admin = AdminConfig::default();
        let err = resolve_delete_targets(&mut session, &store, &no_admin, &listing, "2-3 ")
            .await
            .unwrap_err();
        assert!(matches!(err, DbCommandError::NotFoundOrUnauthorized { .. }));
    }

    #[tokio::test]
    async fn test_delete_default_directive() {
        let (store, mut session, listing) = setup().await;
        let names =
            resolve_delete_targets(&mut session, &store, &admin(), &listing, "--default pwd")
                .await
                .unwrap();
        assert_eq!(names, vec![DEFAULT_COLLECTION_NAME]);

        let err = resolve_delete_targets(&mut session, &store, &admin(), &listing, "--default nope")
            .await
            .unwrap_err();
        assert!(matches!(err, DbCommandError::NotFoundOrUnauthorized { .. }));
    }

    #[tokio::test]
    async fn test_delete_foreign_requires_owner() {
        let (store, mut session, listing) = setup().await;
        let names =
            resolve_delete_targets(&mut session, &store, &admin(), &listing, "u-bbbbbb-shared")
                .await
                .unwrap();
        assert_eq!(names, vec!["u-bbbbbb-shared"]);

        let err =
            resolve_delete_targets(&mut session, &store, &admin(), &listing, "u-bbbbbb-viewable")
                .await
                .unwrap_err();
        assert!(matches!(err, DbCommandError::NotFoundOrUnauthorized { .. }));

        let mut bob = ChatSession::with_default_collection(Some(BOB.to_string()));
        let bob_listing =
            CollectionListing::for_user(bob.user_id(), &store.list_collections().await.unwrap())
                .unwrap();
        let names = resolve_delete_targets(&mut bob, &store, &admin(), &bob_listing, "shared")
            .await
            .unwrap();
        assert_eq!(names, vec!["u-bbbbbb-shared"]);
    }
}
