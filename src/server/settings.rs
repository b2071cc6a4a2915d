use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::UpdateSettingsRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::EditorSettings;

pub async fn get_settings(auth: RequireUser) -> impl IntoResponse {
    let settings = EditorSettings {
        autosave_on: auth.user.autosave_on,
        vim_on: auth.user.vim_on,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(settings)))
}

pub async fn update_settings(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    // Absent fields keep their stored value.
    let settings = EditorSettings {
        autosave_on: req.autosave_on.unwrap_or(auth.user.autosave_on),
        vim_on: req.vim_on.unwrap_or(auth.user.vim_on),
    };

    store
        .update_user_settings(&auth.user.id, settings)
        .api_err("Failed to update settings")?;

    let user = store
        .get_user(&auth.user.id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let settings = EditorSettings {
        autosave_on: user.autosave_on,
        vim_on: user.vim_on,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(settings)))
}
