use std::time::Duration;

use reqwest::{Client, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::credentials::Credentials;
use crate::auth::{SESSION_COOKIE, session_from_cookies};
use crate::types::User;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    cookie: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Signs in with email and password, returning the account and the raw
/// session cookie value the server issued.
pub async fn sign_in(
    server_url: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<(User, String)> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    let url = format!(
        "{}/api/v1/auth/session",
        server_url.trim_end_matches('/')
    );

    let resp = client
        .post(&url)
        .json(&SignInRequest { email, password })
        .send()
        .await?;

    let session = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| session_from_cookies(Some(v)));

    if !resp.status().is_success() {
        let api_resp: ApiResponse<()> = resp.json().await?;
        anyhow::bail!(
            api_resp
                .error
                .unwrap_or_else(|| "Server error (no details provided)".into())
        );
    }

    let session =
        session.ok_or_else(|| anyhow::anyhow!("Server did not issue a session cookie"))?;

    let api_resp: ApiResponse<User> = resp.json().await?;
    let user = api_resp
        .data
        .ok_or_else(|| anyhow::anyhow!("Server returned an empty response"))?;

    Ok((user, session))
}

impl ApiClient {
    pub fn new(creds: &Credentials) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: creds.server_url.trim_end_matches('/').to_string(),
            cookie: format!("{SESSION_COOKIE}={}", creds.session),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .header(header::COOKIE, &self.cookie)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .header(header::COOKIE, &self.cookie)
            .json(body)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self
            .client
            .put(&url)
            .header(header::COOKIE, &self.cookie)
            .json(body)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self
            .client
            .patch(&url)
            .header(header::COOKIE, &self.cookie)
            .json(body)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let resp = self
            .client
            .delete(&url)
            .header(header::COOKIE, &self.cookie)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let api_resp: ApiResponse<()> = resp.json().await?;
            Err(anyhow::anyhow!(api_resp.error.unwrap_or_else(|| {
                "Server error (no details provided)".into()
            })))
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> anyhow::Result<T> {
        if resp.status().is_success() {
            let api_resp: ApiResponse<T> = resp.json().await?;
            api_resp
                .data
                .ok_or_else(|| anyhow::anyhow!("Server returned an empty response"))
        } else {
            let api_resp: ApiResponse<()> = resp.json().await?;
            Err(anyhow::anyhow!(api_resp.error.unwrap_or_else(|| {
                "Server error (no details provided)".into()
            })))
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
