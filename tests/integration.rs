use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

const ADMIN_ENV: &str = "DOCDB_TEST_ADMIN_PASSWORD";
const ALICE: &str = "alice-aaaaaa";
const BOB: &str = "bob-bbbbbb";
const CAROL: &str = "carol-cccccc";
const DEFAULT: &str = "docdocgo-documentation";

fn docdb_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docdb");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(files_dir.join("alpha.md"), "# Alpha\n\nRust and cargo.").unwrap();
    fs::write(files_dir.join("beta.txt"), "Beta notes about deployment.").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/docdb.sqlite"

[admin]
password_env = "{}"
"#,
        root.display(),
        ADMIN_ENV
    );

    let config_path = config_dir.join("docdb.toml");
    fs::write(&config_path, config_content).unwrap();

    let (_, stderr, success) = run_docdb(&config_path, None, &["init"]);
    assert!(success, "init failed: {}", stderr);

    (tmp, config_path)
}

fn command(config_path: &Path, user: Option<&str>, args: &[&str]) -> Command {
    let mut cmd = Command::new(docdb_binary());
    cmd.arg("--config").arg(config_path.to_str().unwrap());
    if let Some(user) = user {
        cmd.arg("--user").arg(user);
    }
    cmd.args(args).env_remove(ADMIN_ENV);
    cmd
}

fn output_of(mut cmd: Command) -> (String, String, bool) {
    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docdb binary: {}", e));
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run_docdb(config_path: &Path, user: Option<&str>, args: &[&str]) -> (String, String, bool) {
    output_of(command(config_path, user, args))
}

fn run_docdb_admin(
    config_path: &Path,
    user: Option<&str>,
    args: &[&str],
    password: &str,
) -> (String, String, bool) {
    let mut cmd = command(config_path, user, args);
    cmd.env(ADMIN_ENV, password);
    output_of(cmd)
}

fn create(config_path: &Path, user: &str, name: &str) {
    let (stdout, stderr, success) = run_docdb(config_path, Some(user), &["create", name]);
    assert!(success, "create failed: stdout={}, stderr={}", stdout, stderr);
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_docdb(&config_path, None, &["init"]);
    assert!(success, "Second init failed (not idempotent)");
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_list_default_first_then_sorted() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "zeta");
    create(&config_path, ALICE, "alpha");
    create(&config_path, BOB, "bobs-private");

    let (stdout, _, success) = run_docdb(&config_path, Some(ALICE), &["db", "list"]);
    assert!(success);
    let expected = format!("Available collections:\n\n1. {}\n2. alpha\n3. zeta", DEFAULT);
    assert!(stdout.contains(&expected), "stdout={}", stdout);
    assert!(!stdout.contains("bobs-private"));
}

#[test]
fn test_use_by_index() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "alpha");
    create(&config_path, ALICE, "beta");

    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "use", "2"]);
    assert!(stdout.contains("Switched to collection: `alpha`."), "stdout={}", stdout);
    assert!(stdout.contains("active collection: u-aaaaaa-alpha"));

    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "use", "4"]);
    assert!(stdout.contains("out of range"), "stdout={}", stdout);
}

#[test]
fn test_shared_collection_access() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "notes");

    let (_, stderr, success) = run_docdb(
        &config_path,
        Some(ALICE),
        &["grant", "notes", "--to-user", BOB, "--role", "editor"],
    );
    assert!(success, "grant failed: {}", stderr);

    let (stdout, _, _) = run_docdb(&config_path, Some(BOB), &["db", "use", "u-aaaaaa-notes"]);
    assert!(stdout.contains("Switched to collection: `u-aaaaaa-notes`."), "stdout={}", stdout);

    let (stdout, _, _) = run_docdb(&config_path, Some(CAROL), &["db", "use", "u-aaaaaa-notes"]);
    assert!(stdout.contains("doesn't exist or you don't have owner access"), "stdout={}", stdout);

    // Editors cannot delete.
    let (stdout, _, _) = run_docdb(&config_path, Some(BOB), &["db", "delete", "u-aaaaaa-notes"]);
    assert!(stdout.contains("doesn't exist"), "stdout={}", stdout);
}

#[test]
fn test_rename_by_sharer_keeps_native_owner() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "notes");
    let (_, stderr, success) = run_docdb(
        &config_path,
        Some(ALICE),
        &["grant", "notes", "--to-user", BOB, "--role", "owner"],
    );
    assert!(success, "grant failed: {}", stderr);

    let (stdout, _, _) = run_docdb(
        &config_path,
        Some(BOB),
        &["db", "--collection", "u-aaaaaa-notes", "rename", "renamed"],
    );
    assert!(stdout.contains("Collection renamed to `renamed`."), "stdout={}", stdout);
    assert!(stdout.contains("active collection: u-aaaaaa-renamed"));

    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "list"]);
    assert!(stdout.contains("2. renamed"), "stdout={}", stdout);
}

#[test]
fn test_rename_default_forbidden() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "rename", "mine"]);
    assert!(stdout.contains("You cannot rename the default collection."));
}

#[test]
fn test_delete_current_switches_to_default() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "scratch");

    let (stdout, _, _) = run_docdb(
        &config_path,
        Some(ALICE),
        &["db", "--collection", "scratch", "delete", "-c"],
    );
    assert!(stdout.contains("Collection `scratch` deleted."), "stdout={}", stdout);
    assert!(stdout.contains(&format!("active collection: {}", DEFAULT)));

    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "list"]);
    assert!(!stdout.contains("scratch"));
}

#[test]
fn test_delete_default_index_rejected() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "alpha");

    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "delete", "1"]);
    assert!(stdout.contains("doesn't exist"), "stdout={}", stdout);

    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "list"]);
    assert!(stdout.contains(&format!("1. {}", DEFAULT)));
}

#[test]
fn test_admin_list_and_range_delete() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "a");
    create(&config_path, ALICE, "b");
    create(&config_path, ALICE, "c");
    create(&config_path, BOB, "private");

    // Without the env var the password is just an unknown value.
    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "list", "pwd"]);
    assert!(stdout.starts_with("Available collections:"), "stdout={}", stdout);

    let (stdout, _, _) = run_docdb_admin(&config_path, Some(ALICE), &["db", "list", "pwd"], "pwd");
    assert!(stdout.contains("Full collection names for all users:"));
    assert!(stdout.contains("u-bbbbbb-private"));

    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "delete", "2-3", "pwd"]);
    assert!(stdout.contains("doesn't exist"), "stdout={}", stdout);

    let (stdout, _, _) =
        run_docdb_admin(&config_path, Some(ALICE), &["db", "delete", "2-3", "pwd"], "pwd");
    assert!(stdout.contains("Collections `a, b` deleted."), "stdout={}", stdout);
}

#[test]
fn test_add_documents_requires_editor() {
    let (tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "notes");
    let files = tmp.path().join("files");
    let files = files.to_str().unwrap();

    let (stdout, stderr, success) = run_docdb(
        &config_path,
        Some(ALICE),
        &["add", "--collection", "notes", files],
    );
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("upserted documents: 2"));

    // Unchanged files are not rewritten.
    let (stdout, _, _) = run_docdb(
        &config_path,
        Some(ALICE),
        &["add", "--collection", "notes", files],
    );
    assert!(stdout.contains("upserted documents: 0"));

    let (_, _, success) = run_docdb(
        &config_path,
        Some(BOB),
        &["add", "--collection", "u-aaaaaa-notes", files],
    );
    assert!(!success, "bob should not be able to add documents");

    run_docdb(
        &config_path,
        Some(ALICE),
        &["grant", "notes", "--code", "team-code", "--role", "editor"],
    );
    let (stdout, stderr, success) = run_docdb(
        &config_path,
        Some(BOB),
        &[
            "add",
            "--collection",
            "u-aaaaaa-notes",
            "--access-code",
            "team-code",
            files,
        ],
    );
    assert!(success, "add with code failed: stdout={}, stderr={}", stdout, stderr);
}

#[test]
fn test_add_to_default_requires_admin() {
    let (tmp, config_path) = setup_test_env();
    let files = tmp.path().join("files");
    let files = files.to_str().unwrap();

    let (_, _, success) = run_docdb(&config_path, Some(ALICE), &["add", files]);
    assert!(!success);

    let (stdout, _, success) = run_docdb_admin(
        &config_path,
        Some(ALICE),
        &["add", "--access-code", "pwd", files],
        "pwd",
    );
    assert!(success);
    assert!(stdout.contains("upserted documents: 2"));

    let (stdout, _, _) = run_docdb_admin(&config_path, Some(ALICE), &["db", "list", "pwd"], "pwd");
    assert!(stdout.contains(&format!("1. {} (2 documents)", DEFAULT)), "stdout={}", stdout);
}

#[test]
fn test_shell_session() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "alpha");
    create(&config_path, ALICE, "beta");

    let mut child = command(&config_path, Some(ALICE), &["shell"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"/db use beta\n/db rename gamma\nhello\n/db list\nexit\n/db delete 2\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(output.status.success());

    assert!(stdout.contains("Switched to collection: `beta`."));
    assert!(stdout.contains("Collection renamed to `gamma`."));
    assert!(stdout.contains("Only /db commands are available here."));
    assert!(stdout.contains("2. alpha\n3. gamma"), "stdout={}", stdout);
    assert!(!stdout.contains("deleted"), "commands after exit must not run");
}

#[test]
fn test_db_json_envelope() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "alpha");

    let (stdout, _, success) =
        run_docdb(&config_path, Some(ALICE), &["db", "--json", "use", "alpha"]);
    assert!(success);
    let answer: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(answer["answer"], "Switched to collection: `alpha`.");
    assert_eq!(answer["switch_to"], "u-aaaaaa-alpha");

    let (stdout, _, _) = run_docdb(&config_path, Some(ALICE), &["db", "--json", "list"]);
    let answer: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(answer.get("switch_to").is_none());
}

#[test]
fn test_access_code_unlocks_active_collection() {
    let (_tmp, config_path) = setup_test_env();
    create(&config_path, ALICE, "notes");
    run_docdb(
        &config_path,
        Some(ALICE),
        &["grant", "notes", "--code", "owner-code", "--role", "owner"],
    );

    let (stdout, _, _) = run_docdb(
        &config_path,
        Some(BOB),
        &["db", "--collection", "u-aaaaaa-notes", "rename", "shared"],
    );
    assert!(stdout.contains("don't have owner access"), "stdout={}", stdout);

    let (stdout, _, _) = run_docdb(
        &config_path,
        Some(BOB),
        &[
            "db",
            "--collection",
            "u-aaaaaa-notes",
            "--access-code",
            "owner-code",
            "rename",
            "shared",
        ],
    );
    assert!(stdout.contains("Collection renamed to `shared`."), "stdout={}", stdout);
    assert!(stdout.contains("active collection: u-aaaaaa-shared"));
}
