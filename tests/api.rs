//! End-to-end API tests against a spawned server binary.
//!
//! Each test boots its own server in a temp data directory and talks to it
//! over HTTP, driving the same JSON surface real clients use. The session
//! cookie is carried by hand so the cookie contract stays visible in tests.

mod common;

use reqwest::{Method, StatusCode, header};
use serde_json::{Value, json};

struct Session {
    client: reqwest::Client,
    base_url: String,
    cookie: String,
}

impl Session {
    fn anonymous(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            cookie: String::new(),
        }
    }

    /// Creates an account and captures the session cookie issued with it.
    async fn sign_up(base_url: &str, name: &str, email: &str, password: &str) -> Self {
        let mut session = Self::anonymous(base_url);
        let resp = session
            .post(
                "/users",
                &json!({"name": name, "email": email, "password": password}),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        session.cookie = extract_session_cookie(&resp);
        session
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}/api/v1{}", self.base_url, path));
        if !self.cookie.is_empty() {
            builder = builder.header(header::COOKIE, &self.cookie);
        }
        builder
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.request(Method::GET, path).send().await.expect("send")
    }

    async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.request(Method::POST, path)
            .json(body)
            .send()
            .await
            .expect("send")
    }

    async fn put(&self, path: &str, body: &Value) -> reqwest::Response {
        self.request(Method::PUT, path)
            .json(body)
            .send()
            .await
            .expect("send")
    }

    async fn patch(&self, path: &str, body: &Value) -> reqwest::Response {
        self.request(Method::PATCH, path)
            .json(body)
            .send()
            .await
            .expect("send")
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.request(Method::DELETE, path)
            .send()
            .await
            .expect("send")
    }
}

fn extract_session_cookie(resp: &reqwest::Response) -> String {
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie issued")
        .to_str()
        .expect("cookie is ascii");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn data(resp: reqwest::Response) -> Value {
    let body: Value = resp.json().await.expect("parse json");
    body["data"].clone()
}

async fn error_message(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.expect("parse json");
    body["error"].as_str().expect("error message").to_string()
}

async fn create_workspace(session: &Session, name: &str) -> Value {
    let resp = session.post("/workspaces", &json!({"name": name})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    data(resp).await
}

async fn create_folder(session: &Session, workspace_id: &str, name: &str) -> Value {
    let resp = session
        .post(
            "/folders",
            &json!({"name": name, "workspace_id": workspace_id}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    data(resp).await
}

async fn create_file(
    session: &Session,
    workspace_id: &str,
    folder_id: Option<&str>,
    title: &str,
) -> Value {
    let resp = session
        .post(
            "/files",
            &json!({"title": title, "workspace_id": workspace_id, "folder_id": folder_id}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    data(resp).await
}

// ============================================================================
// Health and Sessions
// ============================================================================

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let server = common::TestServer::start().await;

    let resp = reqwest::get(format!("{}/health", server.base_url))
        .await
        .expect("request health");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "OK");
}

#[tokio::test]
async fn signup_issues_session_and_default_workspace() {
    let server = common::TestServer::start().await;
    let session = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;

    assert!(session.cookie.starts_with("sprout_session="));

    let workspaces = data(session.get("/workspaces").await).await;
    let workspaces = workspaces.as_array().expect("workspace list");
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0]["name"], "Personal");
    assert_eq!(workspaces[0]["folders"], json!([]));
    assert_eq!(workspaces[0]["files"], json!([]));
}

#[tokio::test]
async fn signup_validates_input() {
    let server = common::TestServer::start().await;
    let anon = Session::anonymous(&server.base_url);

    let resp = anon
        .post("/users", &json!({"email": "ana@example.com"}))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(resp).await,
        "Name, email, and password are required"
    );

    Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;
    let resp = anon
        .post(
            "/users",
            &json!({"name": "Other", "email": "ana@example.com", "password": "pw123456"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "A user with this email already exists"
    );
}

#[tokio::test]
async fn sign_in_distinguishes_unknown_email_from_bad_password() {
    let server = common::TestServer::start().await;
    Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;
    let anon = Session::anonymous(&server.base_url);

    let resp = anon
        .post(
            "/auth/session",
            &json!({"email": "nobody@example.com", "password": "hunter22"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = anon
        .post(
            "/auth/session",
            &json!({"email": "ana@example.com", "password": "wrong"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "Invalid password");

    let resp = anon
        .post(
            "/auth/session",
            &json!({"email": "ana@example.com", "password": "hunter22"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = extract_session_cookie(&resp);
    assert!(cookie.starts_with("sprout_session="));
    let user = data(resp).await;
    assert_eq!(user["email"], "ana@example.com");
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn me_reflects_session_state() {
    let server = common::TestServer::start().await;

    let anon = Session::anonymous(&server.base_url);
    let resp = anon.get("/auth/me").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "Authentication required");

    let mut forged = Session::anonymous(&server.base_url);
    forged.cookie = "sprout_session=not-a-real-token".to_string();
    let resp = forged.get("/auth/me").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "Invalid session");

    let session = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;
    let me = data(session.get("/auth/me").await).await;
    assert_eq!(me["name"], "Ana");
    assert_eq!(me["email"], "ana@example.com");
    assert!(me["id"].is_string());

    let resp = session.delete("/auth/session").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cleared = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("clearing cookie")
        .to_str()
        .expect("ascii");
    assert!(cleared.contains("Max-Age=0"));
}

// ============================================================================
// Workspaces
// ============================================================================

#[tokio::test]
async fn workspace_crud_lifecycle() {
    let server = common::TestServer::start().await;
    let session = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;

    let resp = session.post("/workspaces", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let workspace = create_workspace(&session, "Pessoal").await;
    let id = workspace["id"].as_str().expect("workspace id");

    let fetched = data(session.get(&format!("/workspaces/{id}")).await).await;
    assert_eq!(fetched["name"], "Pessoal");
    assert_eq!(fetched["folders"], json!([]));
    assert_eq!(fetched["files"], json!([]));

    let resp = session
        .put(&format!("/workspaces/{id}"), &json!({"name": "Trabalho"}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(data(resp).await["name"], "Trabalho");

    let resp = session.delete(&format!("/workspaces/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = session.get(&format!("/workspaces/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The default workspace from signup is untouched.
    let remaining = data(session.get("/workspaces").await).await;
    assert_eq!(remaining.as_array().expect("list").len(), 1);
}

// ============================================================================
// Folders and Containment
// ============================================================================

#[tokio::test]
async fn folder_delete_refused_until_emptied() {
    let server = common::TestServer::start().await;
    let session = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;

    let workspace = create_workspace(&session, "Pessoal").await;
    let ws_id = workspace["id"].as_str().expect("id");

    let folder = create_folder(&session, ws_id, "Notes").await;
    let folder_id = folder["id"].as_str().expect("id");
    assert_eq!(folder["files"], json!([]));

    let file = create_file(&session, ws_id, Some(folder_id), "Todo").await;
    let file_id = file["id"].as_str().expect("id");

    let resp = session.delete(&format!("/folders/{folder_id}")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "Cannot delete folder with files. Move or delete files first."
    );

    // Move the file to the workspace root, then the delete goes through.
    let resp = session
        .patch(&format!("/files/{file_id}"), &json!({"folder_id": null}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(data(resp).await["folder"], Value::Null);

    let resp = session.delete(&format!("/folders/{folder_id}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let snapshot = data(session.get(&format!("/workspaces/{ws_id}")).await).await;
    assert_eq!(snapshot["folders"], json!([]));
    assert_eq!(
        snapshot["files"].as_array().expect("files").len(),
        1
    );
}

#[tokio::test]
async fn file_moves_validate_target_folder() {
    let server = common::TestServer::start().await;
    let session = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;

    let workspace = create_workspace(&session, "Pessoal").await;
    let ws_id = workspace["id"].as_str().expect("id");
    let other = create_workspace(&session, "Trabalho").await;
    let other_id = other["id"].as_str().expect("id");

    let folder_a = create_folder(&session, ws_id, "Notes").await;
    let folder_b = create_folder(&session, ws_id, "Drafts").await;
    let foreign = create_folder(&session, other_id, "Elsewhere").await;

    let file = create_file(&session, ws_id, Some(folder_a["id"].as_str().expect("id")), "Todo").await;
    let file_id = file["id"].as_str().expect("id");
    assert_eq!(file["folder"]["name"], "Notes");

    let resp = session
        .patch(
            &format!("/files/{file_id}"),
            &json!({"folder_id": folder_b["id"]}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(data(resp).await["folder"]["name"], "Drafts");

    // A folder from another workspace is not a valid target, nor is a
    // folder that does not exist.
    let resp = session
        .patch(
            &format!("/files/{file_id}"),
            &json!({"folder_id": foreign["id"]}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Folder not found");

    let resp = session
        .patch(
            &format!("/files/{file_id}"),
            &json!({"folder_id": "no-such-folder"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // A patch that leaves the folder out does not reparent.
    let resp = session
        .patch(&format!("/files/{file_id}"), &json!({"title": "Todo v2"}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = data(resp).await;
    assert_eq!(updated["title"], "Todo v2");
    assert_eq!(updated["folder"]["name"], "Drafts");
}

// ============================================================================
// Ownership Isolation
// ============================================================================

#[tokio::test]
async fn resources_of_other_accounts_look_nonexistent() {
    let server = common::TestServer::start().await;
    let ana = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;
    let bea = Session::sign_up(&server.base_url, "Bea", "bea@example.com", "hunter23").await;

    let workspace = create_workspace(&ana, "Pessoal").await;
    let ws_id = workspace["id"].as_str().expect("id");
    let folder = create_folder(&ana, ws_id, "Notes").await;
    let folder_id = folder["id"].as_str().expect("id");
    let file = create_file(&ana, ws_id, None, "Todo").await;
    let file_id = file["id"].as_str().expect("id");

    let resp = bea.get(&format!("/workspaces/{ws_id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Workspace not found");

    let resp = bea.get(&format!("/files/{file_id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "File not found");

    let resp = bea
        .patch(&format!("/files/{file_id}"), &json!({"content": "mine now"}))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = bea.delete(&format!("/folders/{folder_id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = bea
        .get(&format!("/folders?workspace_id={ws_id}"))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Nothing of Ana's leaks into Bea's listing, and Ana still sees hers.
    let bea_workspaces = data(bea.get("/workspaces").await).await;
    assert!(
        bea_workspaces
            .as_array()
            .expect("list")
            .iter()
            .all(|w| w["name"] != "Pessoal")
    );
    let resp = ana.get(&format!("/files/{file_id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Settings and Profile
// ============================================================================

#[tokio::test]
async fn settings_update_is_partial_and_scoped_to_settings_fields() {
    let server = common::TestServer::start().await;
    let session = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;

    let settings = data(session.get("/settings").await).await;
    assert_eq!(settings, json!({"autosave_on": true, "vim_on": false}));

    let resp = session.put("/settings", &json!({"vim_on": true})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        data(resp).await,
        json!({"autosave_on": true, "vim_on": true})
    );

    let resp = session.put("/settings", &json!({"autosave_on": false})).await;
    assert_eq!(
        data(resp).await,
        json!({"autosave_on": false, "vim_on": true})
    );
}

#[tokio::test]
async fn profile_update_requires_current_password() {
    let server = common::TestServer::start().await;
    let session = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;
    let me = data(session.get("/auth/me").await).await;
    let user_id = me["id"].as_str().expect("id");

    let resp = session
        .put(
            &format!("/users/{user_id}"),
            &json!({
                "name": "Ana Maria",
                "email": "ana@example.com",
                "password": "newpass99",
                "old_password": "wrong"
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "Invalid password");

    let resp = session
        .put(
            &format!("/users/{user_id}"),
            &json!({
                "name": "Ana Maria",
                "email": "ana@example.com",
                "password": "newpass99",
                "old_password": "hunter22"
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(data(resp).await["name"], "Ana Maria");

    // The new password is live immediately.
    let anon = Session::anonymous(&server.base_url);
    let resp = anon
        .post(
            "/auth/session",
            &json!({"email": "ana@example.com", "password": "newpass99"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn profile_routes_are_self_only() {
    let server = common::TestServer::start().await;
    let ana = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;
    let bea = Session::sign_up(&server.base_url, "Bea", "bea@example.com", "hunter23").await;

    let me = data(ana.get("/auth/me").await).await;
    let ana_id = me["id"].as_str().expect("id");

    let profile = data(ana.get(&format!("/users/{ana_id}")).await).await;
    assert_eq!(profile["email"], "ana@example.com");
    let workspaces = profile["workspaces"].as_array().expect("workspaces");
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0]["name"], "Personal");

    let resp = bea.get(&format!("/users/{ana_id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = bea.delete(&format!("/users/{ana_id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Deleting your own account cascades and kills the session.
    let resp = ana.delete(&format!("/users/{ana_id}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = ana.get("/auth/me").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Autosave End to End
// ============================================================================

struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    cookie: String,
}

impl sprout::sync::SaveGateway for HttpGateway {
    async fn save_file(&self, file_id: &str, title: &str, content: &str) -> anyhow::Result<()> {
        let resp = self
            .client
            .patch(format!("{}/api/v1/files/{file_id}", self.base_url))
            .header(header::COOKIE, &self.cookie)
            .json(&json!({"title": title, "content": content}))
            .send()
            .await?;
        anyhow::ensure!(resp.status().is_success(), "save failed: {}", resp.status());
        Ok(())
    }
}

/// A note edited in one burst is persisted once by the debounce cycle and
/// readable back through the API.
#[tokio::test]
async fn edited_note_autosaves_to_server() {
    let server = common::TestServer::start().await;
    let session = Session::sign_up(&server.base_url, "Ana", "ana@example.com", "hunter22").await;

    let workspace = create_workspace(&session, "Pessoal").await;
    let ws_id = workspace["id"].as_str().expect("id");
    let folder = create_folder(&session, ws_id, "Notes").await;
    let file = create_file(&session, ws_id, Some(folder["id"].as_str().expect("id")), "Todo").await;
    let file_id = file["id"].as_str().expect("id").to_string();

    let engine = sprout::sync::AutosaveEngine::new(HttpGateway {
        client: reqwest::Client::new(),
        base_url: server.base_url.clone(),
        cookie: session.cookie.clone(),
    });
    engine.load_file(
        file_id.clone(),
        "Todo",
        "",
        sprout::types::EditorSettings {
            autosave_on: true,
            vim_on: false,
        },
    );

    engine.update_content("buy");
    engine.update_content("buy milk");
    assert!(engine.has_changes());

    // One debounce window plus slack for the request round trip.
    let mut persisted = String::new();
    for _ in 0..20 {
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        let file = data(session.get(&format!("/files/{file_id}")).await).await;
        persisted = file["content"].as_str().expect("content").to_string();
        if persisted == "buy milk" && !engine.has_changes() {
            break;
        }
    }
    assert_eq!(persisted, "buy milk");
    assert!(!engine.has_changes());

    // The folder assignment survived the save untouched.
    let file = data(session.get(&format!("/files/{file_id}")).await).await;
    assert_eq!(file["folder"]["name"], "Notes");
}
