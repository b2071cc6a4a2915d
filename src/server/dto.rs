use serde::{Deserialize, Deserializer};

// Required fields are still Option here so their absence surfaces as a 400
// with a useful message instead of a deserialization rejection.

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub old_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub autosave_on: Option<bool>,
    pub vim_on: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListFoldersParams {
    pub workspace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub workspace_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesParams {
    pub workspace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFileRequest {
    pub workspace_id: Option<String>,
    pub folder_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Partial file update. `folder_id` distinguishes "leave the parent alone"
/// (field absent) from "move to workspace root" (explicit null).
#[derive(Debug, Deserialize)]
pub struct UpdateFileRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
