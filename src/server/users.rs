use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{RequireUser, build_session_cookie};
use crate::server::AppState;
use crate::server::dto::{SignUpRequest, UpdateProfileRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_email, validate_user_name};
use crate::types::{User, Workspace, WorkspaceSnapshot};

/// Name of the workspace every account starts with.
const DEFAULT_WORKSPACE_NAME: &str = "Personal";

#[derive(Debug, Serialize)]
struct UserWithWorkspaces {
    id: String,
    name: String,
    email: String,
    workspaces: Vec<WorkspaceSnapshot>,
}

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> impl IntoResponse {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request(
            "Name, email, and password are required",
        ));
    }
    validate_user_name(name)?;
    validate_email(email)?;

    let store = state.store.as_ref();

    if store
        .get_user_by_email(email)
        .api_err("Failed to check email")?
        .is_some()
    {
        return Err(ApiError::conflict("A user with this email already exists"));
    }

    let password_hash = state
        .passwords
        .hash(password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash,
        autosave_on: true,
        vim_on: false,
        created_at: now,
        updated_at: now,
    };

    store.create_user(&user).api_err("Failed to create user")?;

    // Every account starts with one workspace to put files in.
    let workspace = Workspace {
        id: Uuid::new_v4().to_string(),
        name: DEFAULT_WORKSPACE_NAME.to_string(),
        owner_id: user.id.clone(),
        created_at: now,
        updated_at: now,
    };
    store
        .create_workspace(&workspace)
        .api_err("Failed to create default workspace")?;

    let token = state
        .session_keys
        .issue(&user.id)
        .map_err(|_| ApiError::internal("Failed to issue session"))?;
    let cookie = build_session_cookie(&token, state.secure_cookies);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::success(user)),
    ))
}

pub async fn get_user(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = &auth.user;
    let store = state.store.as_ref();

    if id != user.id {
        return Err(ApiError::not_found("User not found"));
    }

    let workspaces = store
        .list_workspaces(&user.id)
        .api_err("Failed to list workspaces")?;

    let mut snapshots = Vec::with_capacity(workspaces.len());
    for workspace in workspaces {
        let folders = store
            .list_folders(&workspace.id)
            .api_err("Failed to list folders")?;
        let files = store
            .list_files(&workspace.id)
            .api_err("Failed to list files")?;
        snapshots.push(WorkspaceSnapshot {
            workspace,
            folders,
            files,
        });
    }

    let response = UserWithWorkspaces {
        id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        workspaces: snapshots,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

pub async fn update_user(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    if id != auth.user.id {
        return Err(ApiError::not_found("User not found"));
    }

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();
    let old_password = req.old_password.as_deref().unwrap_or_default();

    if name.is_empty() || email.is_empty() || password.is_empty() || old_password.is_empty() {
        return Err(ApiError::bad_request(
            "Name, email, password, and old password are required",
        ));
    }
    validate_user_name(name)?;
    validate_email(email)?;

    // Profile changes require proving the current password again.
    let valid = state
        .passwords
        .verify(old_password, &auth.user.password_hash)
        .map_err(|_| ApiError::internal("Failed to verify password"))?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid password"));
    }

    if email != auth.user.email
        && store
            .get_user_by_email(email)
            .api_err("Failed to check email")?
            .is_some()
    {
        return Err(ApiError::conflict("A user with this email already exists"));
    }

    let mut user = auth.user;
    user.name = name.to_string();
    user.email = email.to_string();
    user.password_hash = state
        .passwords
        .hash(password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;

    store.update_user(&user).api_err("Failed to update user")?;

    let user = store
        .get_user(&user.id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn delete_user(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    if id != auth.user.id {
        return Err(ApiError::not_found("User not found"));
    }

    store
        .delete_user(&auth.user.id)
        .api_err("Failed to delete user")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
