use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub autosave_on: bool,
    pub vim_on: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A document. `folder_id = None` means the file sits loose at the
/// workspace root. `workspace_id` is stored directly so ownership checks
/// never have to join through the folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: String,
    pub workspace_id: String,
    pub folder_id: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user editor preferences. Handed to the autosave engine explicitly;
/// never read from ambient state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EditorSettings {
    pub autosave_on: bool,
    pub vim_on: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderWithFiles {
    #[serde(flatten)]
    pub folder: Folder,
    pub files: Vec<File>,
}

/// A workspace with its flat folder and file lists, as returned by the
/// workspace endpoints. This is the input the tree projection consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub folders: Vec<Folder>,
    pub files: Vec<File>,
}

/// A file expanded with its owning workspace and folder. File list/detail
/// endpoints return this so clients never have to re-resolve the
/// back-references themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWithRefs {
    #[serde(flatten)]
    pub file: File,
    pub workspace: Workspace,
    pub folder: Option<Folder>,
}
