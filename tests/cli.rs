//! CLI integration tests for sprout admin commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use chrono::Utc;
use predicates::prelude::*;
use sprout::error::Error;
use sprout::store::{SqliteStore, Store};
use sprout::types::{File, Folder, User, Workspace};
use uuid::Uuid;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        Command::cargo_bin("sprout")
            .expect("failed to find binary")
            .args([
                "admin",
                "init",
                "--data-dir",
                &self.data_dir_str(),
                "--non-interactive",
            ])
            .assert()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sprout").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd
    }
}

fn open_store(ctx: &TestContext) -> SqliteStore {
    let db_path = ctx.data_dir().join("sprout.db");
    SqliteStore::new(&db_path).expect("open store")
}

fn seed_user(store: &SqliteStore, email: &str) -> String {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: "Seeded".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        autosave_on: true,
        vim_on: false,
        created_at: now,
        updated_at: now,
    };
    store.create_user(&user).expect("create user");
    user.id
}

fn seed_workspace(store: &SqliteStore, owner_id: &str, name: &str) -> String {
    let now = Utc::now();
    let workspace = Workspace {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        owner_id: owner_id.to_string(),
        created_at: now,
        updated_at: now,
    };
    store.create_workspace(&workspace).expect("create workspace");
    workspace.id
}

fn seed_folder(store: &SqliteStore, workspace_id: &str, name: &str) -> String {
    let now = Utc::now();
    let folder = Folder {
        id: Uuid::new_v4().to_string(),
        workspace_id: workspace_id.to_string(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    };
    store.create_folder(&folder).expect("create folder");
    folder.id
}

fn seed_file(store: &SqliteStore, workspace_id: &str, folder_id: Option<&str>, title: &str) -> String {
    let now = Utc::now();
    let file = File {
        id: Uuid::new_v4().to_string(),
        workspace_id: workspace_id.to_string(),
        folder_id: folder_id.map(String::from),
        title: title.to_string(),
        content: String::new(),
        created_at: now,
        updated_at: now,
    };
    store.create_file(&file).expect("create file");
    file.id
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn init_creates_database_and_session_secret() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Initialized data directory"));

    assert!(ctx.data_dir().join("sprout.db").exists());
    assert!(ctx.data_dir().join(".session_secret").exists());

    let secret = std::fs::read_to_string(ctx.data_dir().join(".session_secret"))
        .expect("failed to read secret file");
    assert_eq!(secret.len(), 64);
    assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
}

#[cfg(unix)]
#[test]
fn init_restricts_session_secret_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let ctx = TestContext::new();
    ctx.init().success();

    let metadata = std::fs::metadata(ctx.data_dir().join(".session_secret"))
        .expect("failed to stat secret file");
    assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
}

#[test]
fn init_rejects_second_initialization() {
    let ctx = TestContext::new();

    ctx.init().success();
    ctx.init()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_preserves_existing_users_when_reinitialization_rejected() {
    let ctx = TestContext::new();

    ctx.init().success();
    let store = open_store(&ctx);
    let user_id = seed_user(&store, "kept@example.com");
    drop(store);

    ctx.init().failure();

    let store = open_store(&ctx);
    let user = store.get_user(&user_id).expect("get user");
    assert_eq!(user.expect("user survives").email, "kept@example.com");
}

// ============================================================================
// Serve Command Tests
// ============================================================================

#[test]
fn serve_refuses_to_start_without_init() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args(["serve", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run 'sprout admin init' first"));
}

// ============================================================================
// Initialized Schema Tests
// ============================================================================

#[test]
fn initialized_database_enforces_folder_containment() {
    let ctx = TestContext::new();
    ctx.init().success();

    let store = open_store(&ctx);
    let user_id = seed_user(&store, "ana@example.com");
    let ws_id = seed_workspace(&store, &user_id, "Personal");
    let folder_id = seed_folder(&store, &ws_id, "Notes");
    let file_id = seed_file(&store, &ws_id, Some(&folder_id), "Todo");

    let blocked = store.delete_folder(&folder_id);
    assert!(matches!(blocked, Err(Error::Conflict(_))));

    let mut file = store.get_file(&file_id).expect("get file").expect("file");
    file.folder_id = None;
    store.update_file(&file).expect("move to root");

    assert!(store.delete_folder(&folder_id).expect("delete empty folder"));
}

#[test]
fn initialized_database_cascades_user_deletion() {
    let ctx = TestContext::new();
    ctx.init().success();

    let store = open_store(&ctx);
    let user_id = seed_user(&store, "ana@example.com");
    let ws_id = seed_workspace(&store, &user_id, "Personal");
    let folder_id = seed_folder(&store, &ws_id, "Notes");
    let file_id = seed_file(&store, &ws_id, None, "Todo");

    assert!(store.delete_user(&user_id).expect("delete user"));

    assert!(store.get_workspace(&ws_id).expect("get workspace").is_none());
    assert!(store.get_folder(&folder_id).expect("get folder").is_none());
    assert!(store.get_file(&file_id).expect("get file").is_none());
}
