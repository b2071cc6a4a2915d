use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::store::Store;
use crate::types::{File, Folder, User, Workspace};

// Ownership checks resolve through the workspace's owner. A resource that
// exists but belongs to someone else is reported as not found, identical to
// one that does not exist.

pub fn require_owned_workspace(
    store: &dyn Store,
    user: &User,
    workspace_id: &str,
) -> Result<Workspace, ApiError> {
    let workspace = store
        .get_workspace(workspace_id)
        .api_err("Failed to get workspace")?
        .or_not_found("Workspace not found")?;

    if workspace.owner_id != user.id {
        return Err(ApiError::not_found("Workspace not found"));
    }

    Ok(workspace)
}

pub fn resolve_owned_folder(
    store: &dyn Store,
    user: &User,
    folder_id: &str,
) -> Result<(Folder, Workspace), ApiError> {
    let folder = store
        .get_folder(folder_id)
        .api_err("Failed to get folder")?
        .or_not_found("Folder not found")?;

    let workspace = store
        .get_workspace(&folder.workspace_id)
        .api_err("Failed to get workspace")?
        .or_not_found("Folder not found")?;

    if workspace.owner_id != user.id {
        return Err(ApiError::not_found("Folder not found"));
    }

    Ok((folder, workspace))
}

pub fn resolve_owned_file(
    store: &dyn Store,
    user: &User,
    file_id: &str,
) -> Result<(File, Workspace), ApiError> {
    let file = store
        .get_file(file_id)
        .api_err("Failed to get file")?
        .or_not_found("File not found")?;

    let workspace = store
        .get_workspace(&file.workspace_id)
        .api_err("Failed to get workspace")?
        .or_not_found("File not found")?;

    if workspace.owner_id != user.id {
        return Err(ApiError::not_found("File not found"));
    }

    Ok((file, workspace))
}
