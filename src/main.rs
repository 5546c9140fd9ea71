//! # docdb CLI
//!
//! The `docdb` binary manages document collections and their access
//! control from the command line.
//!
//! ## Usage
//!
//! ```bash
//! docdb --config ./config/docdb.toml [--user <id>] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docdb init` | Create the SQLite database, tables, and the default collection |
//! | `docdb create <name>` | Create a collection in your namespace |
//! | `docdb add <paths...>` | Add files to a collection (editor access required) |
//! | `docdb grant <collection>` | Share a collection with a user or an access code |
//! | `docdb db <subcommand...>` | Run one `/db` command (`list`, `use`, `rename`, `delete`) |
//! | `docdb shell` | Interactive session reading `/db` commands from stdin |
//!
//! ## Examples
//!
//! ```bash
//! docdb init
//! docdb --user alice-123456 create notes
//! docdb --user alice-123456 grant notes --to-user bob-654321 --role editor
//! docdb --user bob-654321 db use u-123456-notes
//! docdb --user alice-123456 db delete 2, 3
//! BYPASS_SETTINGS_RESTRICTIONS_PASSWORD=pwd docdb db list pwd
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docdb::config::{self, Config};
use docdb::store::CollectionStore;
use docdb::{db, db_cmd, ingest, manage, migrate};
use docdb_core::lifecycle::Grantee;
use docdb_core::naming;
use docdb_core::{AccessRole, ChatSession};

/// docdb: document collections with per-collection access control.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file and an optional `--user` acting user id.
#[derive(Parser)]
#[command(
    name = "docdb",
    about = "docdb: document collections with per-collection access control",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docdb.toml")]
    config: PathBuf,

    /// Acting user id. Defaults to `[session].default_user`; without
    /// either, commands run in console mode with no user separation.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema and the default collection.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Create a collection in your namespace.
    Create {
        /// User-facing collection name.
        name: String,
    },

    /// Add files (or directories of files) to a collection.
    Add {
        /// Target collection (shown or canonical name). Defaults to the
        /// default collection, which only an admin may write to.
        #[arg(long)]
        collection: Option<String>,

        /// Access code granting editor rights, or the admin password for
        /// the default collection.
        #[arg(long)]
        access_code: Option<String>,

        /// Files or directories to add.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Share a collection with a user or an access code.
    Grant {
        /// Collection (shown or canonical name).
        collection: String,

        /// User id to grant the role to.
        #[arg(long = "to-user", conflicts_with = "code")]
        to_user: Option<String>,

        /// Access code to grant the role to.
        #[arg(long)]
        code: Option<String>,

        /// Role to grant: viewer, editor, or owner.
        #[arg(long, default_value = "viewer", value_parser = parse_role)]
        role: AccessRole,
    },

    /// Run a single `/db` command.
    ///
    /// Examples: `db list`, `db use 3`, `db rename my-notes`,
    /// `db delete 2, 4`, `db delete -c`.
    Db {
        /// Active collection for this command (shown or canonical name).
        #[arg(long)]
        collection: Option<String>,

        /// Access code presented for the active collection.
        #[arg(long)]
        access_code: Option<String>,

        /// Print the answer envelope as JSON.
        #[arg(long)]
        json: bool,

        /// Subcommand and value, as typed after `/db`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Start an interactive session reading `/db` commands from stdin.
    Shell {
        /// Initial active collection (shown or canonical name).
        #[arg(long)]
        collection: Option<String>,

        /// Access code presented for the initial active collection.
        #[arg(long)]
        access_code: Option<String>,
    },
}

fn parse_role(s: &str) -> Result<AccessRole, String> {
    s.parse::<AccessRole>().map_err(|e| e.to_string())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve a `--collection` argument: an existing canonical name is used
/// as is, anything else is taken as a name in the user's namespace.
async fn resolve_collection_arg(
    store: &dyn CollectionStore,
    user_id: Option<&str>,
    collection: Option<String>,
) -> Result<Option<String>> {
    let Some(name) = collection else {
        return Ok(None);
    };
    if store.collection_exists(&name).await? {
        return Ok(Some(name));
    }
    Ok(Some(naming::canonical_name(user_id, &name)))
}

async fn start_session(
    store: &dyn CollectionStore,
    cfg: &Config,
    user: Option<String>,
    collection: Option<String>,
) -> Result<ChatSession> {
    let user = user.or_else(|| cfg.session.default_user.clone());
    let active = resolve_collection_arg(store, user.as_deref(), collection).await?;
    Ok(match active {
        Some(active) => ChatSession::new(user, active),
        None => ChatSession::with_default_collection(user),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let cfg = config::load_config(&cli.config)?;
    let admin = cfg.admin.resolve();

    if let Commands::Init = cli.command {
        migrate::run_migrations(&cfg).await?;
        println!("Database initialized successfully.");
        return Ok(());
    }

    let store = db::open_store(&cfg).await?;

    match cli.command {
        Commands::Init => unreachable!(),
        Commands::Create { name } => {
            let session = start_session(&store, &cfg, cli.user, None).await?;
            manage::run_create(&store, &session, &name).await?;
        }
        Commands::Add {
            collection,
            access_code,
            paths,
        } => {
            let session = start_session(&store, &cfg, cli.user, collection).await?;
            ingest::run_add(&store, &session, &admin, access_code.as_deref(), &paths).await?;
        }
        Commands::Grant {
            collection,
            to_user,
            code,
            role,
        } => {
            let grantee = match (to_user, code) {
                (Some(user), None) => Grantee::User(user),
                (None, Some(code)) => Grantee::AccessCode(code),
                _ => bail!("Specify exactly one of --to-user or --code"),
            };
            let mut session = start_session(&store, &cfg, cli.user, None).await?;
            manage::run_grant(&store, &mut session, &admin, &collection, grantee, role).await?;
        }
        Commands::Db {
            collection,
            access_code,
            json,
            args,
        } => {
            let mut session = start_session(&store, &cfg, cli.user, collection).await?;
            if let Some(code) = access_code {
                db_cmd::unlock_active_collection(&store, &mut session, &admin, &code).await?;
            }
            db_cmd::run_db(&store, &mut session, &admin, &args, json).await?;
        }
        Commands::Shell {
            collection,
            access_code,
        } => {
            let mut session = start_session(&store, &cfg, cli.user, collection).await?;
            if let Some(code) = access_code {
                db_cmd::unlock_active_collection(&store, &mut session, &admin, &code).await?;
            }
            let stdin = std::io::stdin();
            db_cmd::run_shell(&store, &mut session, &admin, stdin.lock()).await?;
        }
    }

    store.close().await;
    Ok(())
}
