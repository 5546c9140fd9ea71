//! Errors raised while handling `/db` commands.
//!
//! Every variant is recoverable: [`handle_db_command`](crate::handle_db_command)
//! turns it into a user-facing answer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbCommandError {
    /// Unparseable or out-of-range index, range, or name.
    #[error("{0}")]
    InvalidToken(String),

    /// Name not among the visible collections and the role is insufficient.
    #[error(
        "Collection {name} doesn't exist or you don't have owner access to it. \
         Available collections:\n\n{available}"
    )]
    NotFoundOrUnauthorized { name: String, available: String },

    #[error("{0}")]
    ForbiddenOperation(String),

    #[error("User id {0} is too short to own private collections.")]
    InvalidUserId(String),

    #[error("{context}:\n```\n{source:#}\n```")]
    StoreFailure {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DbCommandError {
    pub fn store(context: impl Into<String>, source: anyhow::Error) -> Self {
        DbCommandError::StoreFailure {
            context: context.into(),
            source,
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        DbCommandError::ForbiddenOperation(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        DbCommandError::InvalidToken(msg.into())
    }
}

/// Attach a user-facing context to a store error.
pub trait StoreResultExt<T> {
    fn or_store_failure(self, context: &str) -> Result<T, DbCommandError>;
}

impl<T> StoreResultExt<T> for anyhow::Result<T> {
    fn or_store_failure(self, context: &str) -> Result<T, DbCommandError> {
        self.map_err(|e| DbCommandError::store(context, e))
    }
}
