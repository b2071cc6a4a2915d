use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;

use crate::auth::{RequireSession, build_session_cookie, clear_session_cookie};
use crate::server::AppState;
use crate::server::dto::SignInRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};

#[derive(Debug, Serialize)]
struct MeResponse {
    id: String,
    name: String,
    email: String,
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> impl IntoResponse {
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let store = state.store.as_ref();

    let user = store
        .get_user_by_email(email)
        .api_err("Failed to look up user")?
        .or_not_found("User not found")?;

    let valid = state
        .passwords
        .verify(password, &user.password_hash)
        .map_err(|_| ApiError::internal("Failed to verify password"))?;

    if !valid {
        return Err(ApiError::unauthorized("Invalid password"));
    }

    let token = state
        .session_keys
        .issue(&user.id)
        .map_err(|_| ApiError::internal("Failed to issue session"))?;
    let cookie = build_session_cookie(&token, state.secure_cookies);

    Ok::<_, ApiError>((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::success(user)),
    ))
}

pub async fn sign_out(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = clear_session_cookie(state.secure_cookies);
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)])
}

pub async fn me(session: RequireSession, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.store.as_ref();

    let user = store
        .get_user(&session.0.sub)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let response = MeResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}
