//! # docdb
//!
//! Document collection management for retrieval-augmented chat, with
//! per-collection access control.
//!
//! Collections are either public, private to one user (`u-<user suffix>-<name>`),
//! or the well-known default collection. Users reach them through `/db`
//! commands (`list`, `use`, `rename`, `delete`) and share them by granting
//! roles to other users or to access codes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │  CLI (docdb) │──▶│     docdb-core        │──▶│   SQLite     │
//! │  db / shell  │   │ naming · access ·     │   │ collections  │
//! │  grant / add │   │ command · lifecycle   │   │ + documents  │
//! └──────────────┘   └──────────────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docdb init
//! docdb --user alice-123456 create notes
//! docdb --user alice-123456 add --collection u-123456-notes ./docs
//! docdb --user alice-123456 db list
//! docdb --user alice-123456 shell
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`sqlite_store`] | SQLite [`CollectionStore`](docdb_core::store::CollectionStore) |
//! | [`db_cmd`] | One-shot and interactive `/db` commands |
//! | [`manage`] | Collection creation and role grants |
//! | [`ingest`] | Adding documents to a collection |

pub mod config;
pub mod db;
pub mod db_cmd;
pub mod ingest;
pub mod manage;
pub mod migrate;
pub mod sqlite_store;

pub use docdb_core::store;
pub use docdb_core::{AccessRole, AdminConfig, Answer, ChatSession};
