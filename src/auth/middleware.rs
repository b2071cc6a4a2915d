use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::COOKIE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::session::{SessionClaims, session_from_cookies};
use crate::error::Error;
use crate::server::AppState;
use crate::types::User;

/// Extractor that requires a signed-in user (valid session cookie).
pub struct RequireUser {
    pub user: User,
}

/// Extractor that verifies the session cookie without touching the store.
/// Handlers that need to distinguish a vanished user from a bad session use
/// this and do the lookup themselves.
pub struct RequireSession(pub SessionClaims);

#[derive(Debug)]
pub enum AuthError {
    MissingSession,
    InvalidSession,
    SessionExpired,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingSession => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid session"),
            AuthError::SessionExpired => (StatusCode::UNAUTHORIZED, "Session expired"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });
        (status, Json(body)).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_session_cookie(parts, state)?;
        Ok(RequireSession(claims))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_session_cookie(parts, state)?;

        // The user may have been deleted since the session was issued.
        let user = state
            .store
            .get_user(&claims.sub)
            .map_err(|_| AuthError::InternalError)?
            .ok_or(AuthError::InvalidSession)?;

        Ok(RequireUser { user })
    }
}

fn verify_session_cookie(
    parts: &Parts,
    state: &Arc<AppState>,
) -> Result<SessionClaims, AuthError> {
    let cookie_header = parts.headers.get(COOKIE).and_then(|h| h.to_str().ok());

    let token = session_from_cookies(cookie_header).ok_or(AuthError::MissingSession)?;

    state.session_keys.verify(&token).map_err(|e| match e {
        Error::SessionExpired => AuthError::SessionExpired,
        _ => AuthError::InvalidSession,
    })
}
