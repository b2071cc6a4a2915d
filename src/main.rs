use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::RngCore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use sprout::auth::{PasswordManager, SessionKeys};
use sprout::cli::{self, AuthCommands, FileCommands, FolderCommands, WorkspaceCommands};
use sprout::config::ServerConfig;
use sprout::server::{AppState, create_router};
use sprout::store::{SqliteStore, Store};
use sprout::types::{User, Workspace};

fn generate_session_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "sprout")]
#[command(about = "A self-hostable notes server with autosave", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database and session secret
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Mark session cookies Secure (enable when serving over HTTPS)
        #[arg(long)]
        secure_cookies: bool,
    },

    /// Sign in and out of a server
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Manage workspaces
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommands,
    },

    /// Manage folders
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },

    /// Manage files
    File {
        #[command(subcommand)]
        command: FileCommands,
    },

    /// Show a workspace as a tree of folders and files
    Ls {
        /// Workspace name (picked interactively if omitted)
        #[arg(short, long)]
        workspace: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and session secret)
    Init {
        /// Data directory for the database and session secret
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

fn run_init(data_dir: String, non_interactive: bool) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("sprout.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let secret_file = data_path.join(".session_secret");

    if secret_file.exists() {
        bail!(
            "Server already initialized. Session secret exists at: {}",
            secret_file.display()
        );
    }

    let secret = generate_session_secret();
    fs::write(&secret_file, &secret)?;

    #[cfg(unix)]
    set_restrictive_permissions(&secret_file);

    println!();
    println!("Initialized data directory at {}", data_path.display());
    println!("Session secret written to: {}", secret_file.display());
    println!();

    if !non_interactive {
        create_first_account_prompt(&store)?;
    }

    Ok(())
}

fn create_first_account_prompt(store: &SqliteStore) -> anyhow::Result<()> {
    let create_account = inquire::Confirm::new("Would you like to create the first account?")
        .with_default(false)
        .prompt()?;

    if !create_account {
        return Ok(());
    }

    let name = inquire::Text::new("Name:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("Name cannot be empty".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let email = inquire::Text::new("Email:")
        .with_validator(|input: &str| {
            if input.contains('@') {
                Ok(inquire::validator::Validation::Valid)
            } else {
                Err("Enter a valid email address".into())
            }
        })
        .prompt()?;

    let password = inquire::Password::new("Password:").prompt()?;

    let passwords = PasswordManager::new();
    let now = Utc::now();

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.trim().to_string(),
        email: email.trim().to_lowercase(),
        password_hash: passwords.hash(&password)?,
        autosave_on: true,
        vim_on: false,
        created_at: now,
        updated_at: now,
    };
    store.create_user(&user)?;

    let workspace = Workspace {
        id: Uuid::new_v4().to_string(),
        name: "Personal".to_string(),
        owner_id: user.id.clone(),
        created_at: now,
        updated_at: now,
    };
    store.create_workspace(&workspace)?;

    println!();
    println!("Created account '{}' with workspace 'Personal'.", user.email);
    println!("Sign in with 'sprout auth login'.");
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sprout=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => {
                run_init(data_dir, non_interactive)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            secure_cookies,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                secure_cookies,
            };

            let secret_file = config.secret_path();
            if !secret_file.exists() {
                bail!(
                    "Server not initialized. Run 'sprout admin init' first to create the database and session secret."
                );
            }
            let secret = fs::read_to_string(&secret_file)?;

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;

            let state = Arc::new(AppState {
                store: Arc::new(store),
                session_keys: SessionKeys::new(secret.trim().as_bytes()),
                passwords: PasswordManager::new(),
                secure_cookies: config.secure_cookies,
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::Auth { command } => match command {
            AuthCommands::Login {
                server,
                email,
                non_interactive,
            } => {
                cli::run_auth_login(server, email, non_interactive).await?;
            }
            AuthCommands::Logout => {
                cli::run_auth_logout().await?;
            }
            AuthCommands::Whoami => {
                cli::run_auth_whoami().await?;
            }
        },
        Commands::Workspace { command } => match command {
            WorkspaceCommands::List => {
                cli::run_workspace_list().await?;
            }
            WorkspaceCommands::Create { name } => {
                cli::run_workspace_create(name).await?;
            }
            WorkspaceCommands::Rename {
                workspace,
                name,
                non_interactive,
            } => {
                cli::run_workspace_rename(workspace, name, non_interactive).await?;
            }
            WorkspaceCommands::Delete {
                workspace,
                non_interactive,
                yes,
            } => {
                cli::run_workspace_delete(workspace, non_interactive, yes).await?;
            }
        },
        Commands::Folder { command } => match command {
            FolderCommands::Create {
                name,
                workspace,
                non_interactive,
            } => {
                cli::run_folder_create(name, workspace, non_interactive).await?;
            }
            FolderCommands::Delete {
                folder,
                workspace,
                non_interactive,
                yes,
            } => {
                cli::run_folder_delete(folder, workspace, non_interactive, yes).await?;
            }
        },
        Commands::File { command } => match command {
            FileCommands::New {
                title,
                workspace,
                folder,
                non_interactive,
            } => {
                cli::run_file_new(title, workspace, folder, non_interactive).await?;
            }
            FileCommands::Cat {
                file,
                workspace,
                non_interactive,
            } => {
                cli::run_file_cat(file, workspace, non_interactive).await?;
            }
            FileCommands::Mv {
                file,
                folder,
                root,
                workspace,
                non_interactive,
            } => {
                cli::run_file_move(file, folder, root, workspace, non_interactive).await?;
            }
            FileCommands::Rm {
                file,
                workspace,
                non_interactive,
                yes,
            } => {
                cli::run_file_delete(file, workspace, non_interactive, yes).await?;
            }
            FileCommands::Write {
                file,
                content,
                workspace,
                non_interactive,
            } => {
                cli::run_file_write(file, content, workspace, non_interactive).await?;
            }
        },
        Commands::Ls {
            workspace,
            non_interactive,
        } => {
            cli::run_ls(workspace, non_interactive).await?;
        }
    }

    Ok(())
}
