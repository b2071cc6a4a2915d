use std::collections::HashMap;
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
use crate::server::AppState;
use crate::server::access::{require_owned_workspace, resolve_owned_file};
use crate::server::dto::{CreateFileRequest, ListFilesParams, UpdateFileRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_file_title;
use crate::store::Store;
use crate::types::{File, FileWithRefs, Folder, Workspace};

fn expand(store: &dyn Store, file: File, workspace: Workspace) -> Result<FileWithRefs, ApiError> {
    let folder = match &file.folder_id {
        Some(folder_id) => store
            .get_folder(folder_id)
            .api_err("Failed to get folder")?,
        None => None,
    };
    Ok(FileWithRefs {
        file,
        workspace,
        folder,
    })
}

/// Resolves a requested parent folder within the given workspace. Folders
/// that do not exist or live in another workspace are both reported as not
/// found.
fn resolve_target_folder(
    store: &dyn Store,
    workspace_id: &str,
    folder_id: &str,
) -> Result<Folder, ApiError> {
    let folder = store
        .get_folder(folder_id)
        .api_err("Failed to get folder")?
        .or_not_found("Folder not found")?;

    if folder.workspace_id != workspace_id {
        return Err(ApiError::not_found("Folder not found"));
    }

    Ok(folder)
}

pub async fn list_files(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListFilesParams>,
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

    let folders_by_id: HashMap<&str, &Folder> =
        folders.iter().map(|f| (f.id.as_str(), f)).collect();

    let expanded: Vec<FileWithRefs> = files
        .into_iter()
        .map(|file| {
            let folder = file
                .folder_id
                .as_deref()
                .and_then(|id| folders_by_id.get(id))
                .map(|f| (*f).clone());
            FileWithRefs {
                file,
                workspace: workspace.clone(),
                folder,
            }
        })
        .collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(expanded)))
}

pub async fn create_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFileRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let workspace_id = req.workspace_id.as_deref().unwrap_or_default();
    let title = req.title.as_deref().map(str::trim).unwrap_or_default();
    if workspace_id.is_empty() || title.is_empty() {
        return Err(ApiError::bad_request("Title and workspace ID are required"));
    }
    validate_file_title(title)?;

    let workspace = require_owned_workspace(store, &auth.user, workspace_id)?;

    let folder_id = req.folder_id.as_deref().filter(|s| !s.is_empty());
    if let Some(folder_id) = folder_id {
        resolve_target_folder(store, &workspace.id, folder_id)?;
    }

    let now = Utc::now();
    let file = File {
        id: Uuid::new_v4().to_string(),
        workspace_id: workspace.id.clone(),
        folder_id: folder_id.map(String::from),
        title: title.to_string(),
        content: req.content.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    store.create_file(&file).api_err("Failed to create file")?;

    let response = expand(store, file, workspace)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn get_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let (file, workspace) = resolve_owned_file(store, &auth.user, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(expand(store, file, workspace)?)))
}

pub async fn update_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFileRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let (mut file, workspace) = resolve_owned_file(store, &auth.user, &id)?;

    if let Some(title) = &req.title {
        let title = title.trim();
        validate_file_title(title)?;
        file.title = title.to_string();
    }

    if let Some(content) = req.content {
        file.content = content;
    }

    match req.folder_id {
        // Field absent: parent unchanged.
        None => {}
        // Explicit null: move to the workspace root.
        Some(None) => file.folder_id = None,
        Some(Some(folder_id)) => {
            if folder_id.is_empty() {
                file.folder_id = None;
            } else {
                let folder = resolve_target_folder(store, &workspace.id, &folder_id)?;
                file.folder_id = Some(folder.id);
            }
        }
    }

    store.update_file(&file).api_err("Failed to update file")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(expand(store, file, workspace)?)))
}

pub async fn delete_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let (file, _) = resolve_owned_file(store, &auth.user, &id)?;

    store
        .delete_file(&file.id)
        .api_err("Failed to delete file")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
