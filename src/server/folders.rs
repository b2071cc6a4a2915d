use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::RequireUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::access::{require_owned_workspace, resolve_owned_folder};
use crate::server::dto::{CreateFolderRequest, ListFoldersParams, UpdateFolderRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::validate_folder_name;
use crate::types::{File, Folder, FolderWithFiles};

fn attach_files(folders: Vec<Folder>, files: &[File]) -> Vec<FolderWithFiles> {
    folders
        .into_iter()
        .map(|folder| {
            let files = files
                .iter()
                .filter(|f| f.folder_id.as_deref() == Some(folder.id.as_str()))
                .cloned()
                .collect();
            FolderWithFiles { folder, files }
        })
        .collect()
}

pub async fn list_folders(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListFoldersParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let workspace_id = params.workspace_id.as_deref().unwrap_or_default();
    if workspace_id.is_empty() {
        return Err(ApiError::bad_request("Workspace ID is required"));
    }

    let workspace = require_owned_workspace(store, &auth.user, workspace_id)?;

    let folders = store
        .list_folders(&workspace.id)
        .api_err("Failed to list folders")?;
    let files = store
        .list_files(&workspace.id)
        .api_err("Failed to list files")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(attach_files(folders, &files))))
}

pub async fn create_folder(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFolderRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let workspace_id = req.workspace_id.as_deref().unwrap_or_default();
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if workspace_id.is_empty() || name.is_empty() {
        return Err(ApiError::bad_request("Name and workspace ID are required"));
    }
    validate_folder_name(name)?;

    let workspace = require_owned_workspace(store, &auth.user, workspace_id)?;

    let now = Utc::now();
    let folder = Folder {
        id: Uuid::new_v4().to_string(),
        workspace_id: workspace.id,
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    };

    store
        .create_folder(&folder)
        .api_err("Failed to create folder")?;

    let response = FolderWithFiles {
        folder,
        files: Vec::new(),
    };

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn update_folder(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFolderRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    validate_folder_name(name)?;

    let (mut folder, workspace) = resolve_owned_folder(store, &auth.user, &id)?;

    folder.name = name.to_string();
    store
        .update_folder(&folder)
        .api_err("Failed to update folder")?;

    let files = store
        .list_files(&workspace.id)
        .api_err("Failed to list files")?;
    let files = files
        .into_iter()
        .filter(|f| f.folder_id.as_deref() == Some(folder.id.as_str()))
        .collect();

    let response = FolderWithFiles { folder, files };

    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

pub async fn delete_folder(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let (folder, _) = resolve_owned_folder(store, &auth.user, &id)?;

    // A folder still holding files is refused; the client must empty it
    // first by moving or deleting the files.
    match store.delete_folder(&folder.id) {
        Ok(_) => {}
        Err(Error::Conflict(message)) => return Err(ApiError::conflict(message)),
        Err(_) => return Err(ApiError::internal("Failed to delete folder")),
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
