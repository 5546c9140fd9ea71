//! `/db` command handler.
//!
//! [`handle_db_command`] is the boundary where every [`DbCommandError`]
//! becomes a plain-text [`Answer`]. Successful `use`, `rename`, and
//! `delete` commands also update the session's active collection and report
//! it in [`Answer::switch_to`] so the chat loop can rebind its vectorstore.

use serde::Serialize;
use tracing::debug;

use crate::command::{
    resolve_delete_targets, resolve_single_target, DbCommand, ParsedDbCommand,
};
use crate::error::{DbCommandError, StoreResultExt};
use crate::lifecycle::{delete_collections, rename_active_collection};
use crate::listing::{numbered, CollectionListing};
use crate::session::{AdminConfig, ChatSession};
use crate::store::CollectionStore;

pub const DB_COMMAND_HELP_TEMPLATE: &str = "\
Your current document collection's full name: `{current_db}`

You can use the following commands to manage your collections:

```
/db list: list your collections
/db use my-docs: switch to the collection named \"my-docs\"
/db use 3: switch to collection #3 in the list
/db rename my-new-name: rename the current collection to \"my-new-name\"
/db delete my-docs: delete the collection named \"my-docs\"
/db delete 3: delete collection #3 in the list
/db delete 2, 4: delete collections #2 and #4
/db delete --current (or -c): delete the current collection
```";

/// Response envelope consumed by the chat loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub answer: String,
    /// Canonical name of the collection the chat loop should switch to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_to: Option<String>,
}

impl Answer {
    /// A plain-text answer with no side effects.
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            switch_to: None,
        }
    }

    pub fn with_switch(mut self, collection: impl Into<String>) -> Self {
        self.switch_to = Some(collection.into());
        self
    }
}

impl From<DbCommandError> for Answer {
    fn from(e: DbCommandError) -> Self {
        Answer::text(e.to_string())
    }
}

/// Handle a parsed `/db` command for `session`.
pub async fn handle_db_command(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    parsed: &ParsedDbCommand,
) -> Answer {
    if parsed.command == DbCommand::None {
        return Answer::text(
            DB_COMMAND_HELP_TEMPLATE.replace("{current_db}", session.active_collection()),
        );
    }
    let active_before = session.active_collection().to_string();
    match handle_subcommand(session, store, admin, parsed).await {
        Ok(answer) => answer,
        Err(e) => {
            debug!(error = %e, "db command failed");
            // A partially applied delete may already have moved the session.
            let answer = Answer::from(e);
            if session.active_collection() != active_before {
                answer.with_switch(session.active_collection())
            } else {
                answer
            }
        }
    }
}

async fn handle_subcommand(
    session: &mut ChatSession,
    store: &dyn CollectionStore,
    admin: &AdminConfig,
    parsed: &ParsedDbCommand,
) -> Result<Answer, DbCommandError> {
    let value = parsed.value.as_str();

    let collections = store
        .list_collections()
        .await
        .or_store_failure("Error listing collections")?;
    let listing = CollectionListing::for_user(session.user_id(), &collections)?;

    match parsed.command {
        DbCommand::List => {
            if !value.is_empty() && admin.matches(Some(value)) {
                let described: Vec<String> = collections
                    .iter()
                    .map(|c| format!("{} ({} documents)", c.name, c.document_count))
                    .collect();
                let all = numbered(described.iter().map(String::as_str));
                return Ok(Answer::text(format!(
                    "Full collection names for all users:\n\n{}",
                    all
                )));
            }
            Ok(Answer::text(format!(
                "{}\n\n**Tip:** To switch to collection number N, type `/db use N`.",
                listing.available_str()
            )))
        }

        DbCommand::Use => {
            if value.is_empty() {
                return Ok(Answer::text(format!(
                    "{}\n\nTo switch collections, you must provide the name or number \
                     of the collection to switch to. Example:\n```\n/db use 3\n```",
                    listing.available_str()
                )));
            }
            let target = resolve_single_target(session, store, admin, &listing, value).await?;
            session.switch_to(target.full.clone());
            Ok(Answer::text(format!("Switched to collection: `{}`.", target.shown))
                .with_switch(target.full))
        }

        DbCommand::Rename => {
            if value.is_empty() {
                return Ok(Answer::text(
                    "To rename the current collection, you must provide a new name. \
                     Example:\n```\n/db rename awesome-new-name\n```",
                ));
            }
            let outcome = rename_active_collection(session, store, admin, value).await?;
            Ok(Answer::text(format!("Collection renamed to `{}`.", outcome.shown))
                .with_switch(outcome.full))
        }

        DbCommand::Delete => {
            if value.is_empty() {
                return Ok(Answer::text(format!(
                    "{}\n\nTo delete a collection, you must provide the name of \
                     the collection to delete, a list of collection numbers, or \
                     the --current (-c) flag to delete the current collection. Examples:\n\
                     ```\n/db delete my-temp-db\n/db delete 2, 4, 19\n\
                     /db delete 19\n/db delete -c\n```",
                    listing.available_str()
                )));
            }
            let full_names = resolve_delete_targets(session, store, admin, &listing, value).await?;
            let outcome = delete_collections(session, store, &full_names).await?;
            let s_or_no_s = if outcome.shown.len() > 1 { "s" } else { "" };
            let answer = Answer::text(format!(
                "Collection{} `{}` deleted.",
                s_or_no_s,
                outcome.shown.join(", ")
            ));
            Ok(if outcome.switched_to_default {
                answer.with_switch(session.active_collection())
            } else {
                answer
            })
        }

        DbCommand::None => unreachable!("handled before dispatch"),
    }
}
