use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::access::require_owned_workspace;
use crate::server::dto::{CreateWorkspaceRequest, UpdateWorkspaceRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::validate_workspace_name;
use crate::store::Store;
use crate::types::{Workspace, WorkspaceSnapshot};

fn snapshot(store: &dyn Store, workspace: Workspace) -> Result<WorkspaceSnapshot, ApiError> {
    let folders = store
        .list_folders(&workspace.id)
        .api_err("Failed to list folders")?;
    let files = store
        .list_files(&workspace.id)
        .api_err("Failed to list files")?;
    Ok(WorkspaceSnapshot {
        workspace,
        folders,
        files,
    })
}

pub async fn list_workspaces(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let workspaces = store
        .list_workspaces(&auth.user.id)
        .api_err("Failed to list workspaces")?;

    let mut snapshots = Vec::with_capacity(workspaces.len());
    for workspace in workspaces {
        snapshots.push(snapshot(store, workspace)?);
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(snapshots)))
}

pub async fn create_workspace(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    validate_workspace_name(name)?;

    let now = Utc::now();
    let workspace = Workspace {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        owner_id: auth.user.id.clone(),
        created_at: now,
        updated_at: now,
    };

    store
        .create_workspace(&workspace)
        .api_err("Failed to create workspace")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(workspace))))
}

pub async fn get_workspace(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let workspace = require_owned_workspace(store, &auth.user, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(snapshot(store, workspace)?)))
}

pub async fn update_workspace(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateWorkspaceRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut workspace = require_owned_workspace(store, &auth.user, &id)?;

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    validate_workspace_name(name)?;

    workspace.name = name.to_string();
    store
        .update_workspace(&workspace)
        .api_err("Failed to update workspace")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(workspace)))
}

pub async fn delete_workspace(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let workspace = require_owned_workspace(store, &auth.user, &id)?;

    store
        .delete_workspace(&workspace.id)
        .api_err("Failed to delete workspace")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
