//! `/db` command execution: one-shot (`docdb db ...`) and interactive
//! (`docdb shell`).
//!
//! The shell keeps one [`ChatSession`] for its whole lifetime, so roles
//! unlocked with an access code stay cached across lines. One-shot
//! invocations start a fresh session every time.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;

use docdb_core::access::get_access_role;
use docdb_core::command::{parse_db_command, parse_subcommand};
use docdb_core::store::CollectionStore;
use docdb_core::{handle_db_command, AccessRole, AdminConfig, Answer, ChatSession};

/// Present `access_code` for the session's active collection.
///
/// The resulting role is cached in the session, so later commands that act
/// on the active collection (`rename`, `delete -c`) see it without the code.
pub async fn unlock_active_collection(
    store: &dyn CollectionStore,
    session: &mut ChatSession,
    admin: &AdminConfig,
    access_code: &str,
) -> Result<AccessRole> {
    let role = get_access_role(session, store, admin, None, Some(access_code)).await?;
    debug!(collection = %session.active_collection(), %role, "unlocked with access code");
    Ok(role)
}

/// Run a single `/db` subcommand (the words after `/db`).
///
/// With `json`, the [`Answer`] envelope is printed as JSON instead of text.
pub async fn run_db(
    store: &dyn CollectionStore,
    session: &mut ChatSession,
    admin: &AdminConfig,
    args: &[String],
    json: bool,
) -> Result<Answer> {
    let parsed = parse_subcommand(&args.join(" "));
    debug!(command = ?parsed.command, "running db command");
    let answer = handle_db_command(session, store, admin, &parsed).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        print_answer(&answer);
    }
    Ok(answer)
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.answer);
    if let Some(collection) = &answer.switch_to {
        println!("active collection: {}", collection);
    }
}

/// Read `/db ...` lines from `input` until EOF or `exit`.
pub async fn run_shell<R: BufRead>(
    store: &dyn CollectionStore,
    session: &mut ChatSession,
    admin: &AdminConfig,
    input: R,
) -> Result<()> {
    let stdout = std::io::stdout();
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }
        match parse_db_command(line) {
            Some(parsed) => {
                let answer = handle_db_command(session, store, admin, &parsed).await;
                print_answer(&answer);
            }
            None => println!(
                "Only /db commands are available here. Type `/db` for help or `exit` to quit."
            ),
        }
        stdout.lock().flush()?;
    }
    Ok(())
}
