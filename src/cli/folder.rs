use inquire::Text;
use serde::Serialize;

use super::credentials::load_credentials;
use super::http_client::ApiClient;
use super::pickers::{confirm_action, pick_folder, resolve_workspace};
use crate::types::FolderWithFiles;

#[derive(Debug, Serialize)]
struct CreateFolderRequest {
    name: String,
    workspace_id: String,
}

pub async fn run_folder_create(
    name: Option<String>,
    workspace: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let name = if let Some(n) = name {
        n
    } else if non_interactive {
        anyhow::bail!("A folder name is required in non-interactive mode");
    } else {
        Text::new("Folder name:").prompt()?
    };

    let request = CreateFolderRequest {
        name,
        workspace_id: snapshot.workspace.id.clone(),
    };
    let folder: FolderWithFiles = client.post("/folders", &request).await?;

    println!();
    println!(
        "Created folder '{}' in workspace '{}'",
        folder.folder.name, snapshot.workspace.name
    );
    println!();

    Ok(())
}

pub async fn run_folder_delete(
    folder: Option<String>,
    workspace: Option<String>,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let Some(folder) = pick_folder(&snapshot, folder, non_interactive)? else {
        return Ok(());
    };

    let file_count = snapshot
        .files
        .iter()
        .filter(|f| f.folder_id.as_deref() == Some(folder.id.as_str()))
        .count();
    if file_count > 0 {
        anyhow::bail!(
            "Folder '{}' still contains {} file(s). Move or delete them first.",
            folder.name,
            file_count
        );
    }

    let confirmed = confirm_action(
        &format!("Delete folder '{}'?", folder.name),
        yes,
        non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    client.delete(&format!("/folders/{}", folder.id)).await?;

    println!();
    println!("Deleted folder '{}'", folder.name);
    println!();

    Ok(())
}
