mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::{EditorSettings, File, Folder, User, Workspace};

/// Storage backend for users, workspaces, folders, and files.
///
/// Containment is strict: every folder belongs to one workspace, every file
/// belongs to one workspace and at most one folder within it. Deleting a user
/// cascades through their workspaces; deleting a folder is refused while it
/// still holds files.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Users
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn update_user_settings(&self, id: &str, settings: EditorSettings) -> Result<()>;
    fn delete_user(&self, id: &str) -> Result<bool>;

    // Workspaces
    fn create_workspace(&self, workspace: &Workspace) -> Result<()>;
    fn get_workspace(&self, id: &str) -> Result<Option<Workspace>>;
    fn list_workspaces(&self, owner_id: &str) -> Result<Vec<Workspace>>;
    fn update_workspace(&self, workspace: &Workspace) -> Result<()>;
    fn delete_workspace(&self, id: &str) -> Result<bool>;

    // Folders
    fn create_folder(&self, folder: &Folder) -> Result<()>;
    fn get_folder(&self, id: &str) -> Result<Option<Folder>>;
    fn list_folders(&self, workspace_id: &str) -> Result<Vec<Folder>>;
    fn update_folder(&self, folder: &Folder) -> Result<()>;
    /// Fails with `Error::Conflict` while the folder still contains files.
    fn delete_folder(&self, id: &str) -> Result<bool>;
    fn count_folder_files(&self, folder_id: &str) -> Result<i64>;

    // Files
    fn create_file(&self, file: &File) -> Result<()>;
    fn get_file(&self, id: &str) -> Result<Option<File>>;
    fn list_files(&self, workspace_id: &str) -> Result<Vec<File>>;
    fn update_file(&self, file: &File) -> Result<()>;
    fn delete_file(&self, id: &str) -> Result<bool>;
}
