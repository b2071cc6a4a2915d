use inquire::Text;
use serde::Serialize;

use super::credentials::load_credentials;
use super::http_client::ApiClient;
use super::pickers::{confirm_action, format_relative_time, resolve_workspace};
use crate::types::{Workspace, WorkspaceSnapshot};

#[derive(Debug, Serialize)]
struct CreateWorkspaceRequest {
    name: String,
}

#[derive(Debug, Serialize)]
struct UpdateWorkspaceRequest {
    name: String,
}

pub async fn run_workspace_list() -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let workspaces: Vec<WorkspaceSnapshot> = client.get("/workspaces").await?;

    if workspaces.is_empty() {
        println!("No workspaces found.");
        return Ok(());
    }

    println!();
    for snapshot in &workspaces {
        println!(
            "  {}  {} folder(s), {} file(s), created {}",
            snapshot.workspace.name,
            snapshot.folders.len(),
            snapshot.files.len(),
            format_relative_time(&snapshot.workspace.created_at)
        );
    }
    println!();
    println!("{} workspace(s) total", workspaces.len());
    println!();

    Ok(())
}

pub async fn run_workspace_create(name: Option<String>) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let name = if let Some(n) = name {
        n
    } else {
        Text::new("Workspace name:").prompt()?
    };

    let request = CreateWorkspaceRequest { name };
    let workspace: Workspace = client.post("/workspaces", &request).await?;

    println!();
    println!("Created workspace '{}'", workspace.name);
    println!();

    Ok(())
}

pub async fn run_workspace_rename(
    workspace: Option<String>,
    name: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let new_name = if let Some(n) = name {
        n
    } else if non_interactive {
        anyhow::bail!("--name is required in non-interactive mode");
    } else {
        Text::new("New name:")
            .with_initial_value(&snapshot.workspace.name)
            .prompt()?
    };

    let request = UpdateWorkspaceRequest { name: new_name };
    let updated: Workspace = client
        .put(&format!("/workspaces/{}", snapshot.workspace.id), &request)
        .await?;

    println!();
    println!(
        "Renamed workspace '{}' to '{}'",
        snapshot.workspace.name, updated.name
    );
    println!();

    Ok(())
}

pub async fn run_workspace_delete(
    workspace: Option<String>,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let confirmed = confirm_action(
        &format!(
            "Delete workspace '{}' with {} folder(s) and {} file(s)?",
            snapshot.workspace.name,
            snapshot.folders.len(),
            snapshot.files.len()
        ),
        yes,
        non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    client
        .delete(&format!("/workspaces/{}", snapshot.workspace.id))
        .await?;

    println!();
    println!("Deleted workspace '{}'", snapshot.workspace.name);
    println!();

    Ok(())
}
