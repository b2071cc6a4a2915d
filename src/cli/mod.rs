mod auth;
mod commands;
pub mod credentials;
mod file;
mod folder;
pub mod http_client;
mod ls;
pub mod pickers;
mod workspace;

pub use auth::{run_auth_login, run_auth_logout, run_auth_whoami};
pub use commands::{AuthCommands, FileCommands, FolderCommands, WorkspaceCommands};
pub use file::{run_file_cat, run_file_delete, run_file_move, run_file_new, run_file_write};
pub use folder::{run_folder_create, run_folder_delete};
pub use ls::run_ls;
pub use workspace::{
    run_workspace_create, run_workspace_delete, run_workspace_list, run_workspace_rename,
};
