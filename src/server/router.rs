use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use super::{files, folders, session, settings, users, workspaces};
use crate::auth::{PasswordManager, SessionKeys};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub session_keys: SessionKeys,
    pub passwords: PasswordManager,
    /// Mark session cookies `Secure`; enable behind HTTPS.
    pub secure_cookies: bool,
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Sessions
        .route("/auth/session", post(session::sign_in))
        .route("/auth/session", delete(session::sign_out))
        .route("/auth/me", get(session::me))
        // Users
        .route("/users", post(users::sign_up))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        // Settings
        .route("/settings", get(settings::get_settings))
        .route("/settings", put(settings::update_settings))
        // Workspaces
        .route("/workspaces", get(workspaces::list_workspaces))
        .route("/workspaces", post(workspaces::create_workspace))
        .route("/workspaces/{id}", get(workspaces::get_workspace))
        .route("/workspaces/{id}", put(workspaces::update_workspace))
        .route("/workspaces/{id}", delete(workspaces::delete_workspace))
        // Folders
        .route("/folders", get(folders::list_folders))
        .route("/folders", post(folders::create_folder))
        .route("/folders/{id}", put(folders::update_folder))
        .route("/folders/{id}", delete(folders::delete_folder))
        // Files
        .route("/files", get(files::list_files))
        .route("/files", post(files::create_file))
        .route("/files/{id}", get(files::get_file))
        .route("/files/{id}", patch(files::update_file))
        .route("/files/{id}", delete(files::delete_file))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
