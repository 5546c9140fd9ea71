//! # docdb Core
//!
//! Shared logic for docdb: collection naming, access roles, permission
//! records, per-session state, the collection store abstraction, and
//! resolution of `/db` commands against a user's visible collections.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Storage is reached only through the
//! [`store::CollectionStore`] trait.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`naming`] | Canonical names, private namespaces, user-facing names |
//! | [`role`] | The ordered [`role::AccessRole`] enum |
//! | [`permissions`] | Per-collection user and access-code settings |
//! | [`session`] | Session role cache, chat session, admin configuration |
//! | [`access`] | Effective role resolution and boolean authorization |
//! | [`listing`] | Visible collections, sorted as shown to a user |
//! | [`command`] | `/db` parsing and target resolution |
//! | [`lifecycle`] | Rename, delete, create, and grant operations |
//! | [`handler`] | `/db` command handler producing [`handler::Answer`]s |
//! | [`store`] | Storage trait and in-memory backend |

pub mod access;
pub mod command;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod listing;
pub mod naming;
pub mod permissions;
pub mod role;
pub mod session;
pub mod store;

pub use error::DbCommandError;
pub use handler::{handle_db_command, Answer};
pub use role::AccessRole;
pub use session::{AdminConfig, ChatSession};
