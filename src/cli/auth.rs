use inquire::Text;
use serde::Deserialize;

use super::credentials::{Credentials, delete_credentials, load_credentials, save_credentials};
use super::http_client::{ApiClient, sign_in};

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
    name: String,
    email: String,
}

fn normalize_server_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    // Strip trailing API paths to avoid duplication when constructing request URLs
    let url = url
        .trim_end_matches("/api/v1")
        .trim_end_matches("/api")
        .trim_end_matches('/');

    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    // Default to http:// for localhost/127.0.0.1, https:// for others
    if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
        format!("http://{}", url)
    } else {
        format!("https://{}", url)
    }
}

pub async fn run_auth_login(
    server: Option<String>,
    email: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let server = if let Some(s) = server {
        if s.trim().is_empty() {
            anyhow::bail!("Server URL cannot be empty");
        }
        s
    } else if non_interactive {
        anyhow::bail!("--server is required in non-interactive mode");
    } else {
        Text::new("Server URL:")
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    Ok(inquire::validator::Validation::Invalid(
                        "Server URL is required".into(),
                    ))
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()?
    };

    let server_url = normalize_server_url(&server);

    let email = if let Some(e) = email {
        e
    } else if non_interactive {
        anyhow::bail!("--email is required in non-interactive mode");
    } else {
        Text::new("Email:")
            .with_validator(|input: &str| {
                if input.contains('@') {
                    Ok(inquire::validator::Validation::Valid)
                } else {
                    Ok(inquire::validator::Validation::Invalid(
                        "Enter a valid email address".into(),
                    ))
                }
            })
            .prompt()?
    };

    // The password never travels through argv. Non-interactive runs read it
    // from SPROUT_PASSWORD; otherwise it is prompted.
    let password = match std::env::var("SPROUT_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ if non_interactive => {
            anyhow::bail!("SPROUT_PASSWORD is required in non-interactive mode")
        }
        _ => inquire::Password::new("Password:")
            .without_confirmation()
            .prompt()?,
    };

    let (user, session) = sign_in(&server_url, &email, &password).await?;

    let creds = Credentials {
        server_url: server_url.clone(),
        session,
    };
    save_credentials(&creds)?;

    println!();
    println!("Logged in to {} as {}", server_url, user.email);
    println!();

    Ok(())
}

pub async fn run_auth_logout() -> anyhow::Result<()> {
    if delete_credentials()? {
        println!();
        println!("Logged out successfully.");
        println!();
    } else {
        println!();
        println!("No credentials found.");
        println!();
    }
    Ok(())
}

pub async fn run_auth_whoami() -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let me: MeResponse = client.get("/auth/me").await?;

    println!();
    println!("{} <{}>", me.name, me.email);
    println!("  Server: {}", client.base_url());
    println!("  User ID: {}", me.id);
    println!();

    Ok(())
}
