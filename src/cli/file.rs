use std::io::Read;

use inquire::Text;
use serde::Serialize;

use super::credentials::load_credentials;
use super::http_client::ApiClient;
use super::pickers::{confirm_action, pick_file, pick_folder, resolve_workspace};
use crate::sync::{AutosaveEngine, ReparentPlan, SaveGateway, SaveStatus, plan_reparent};
use crate::types::{EditorSettings, File, FileWithRefs};

#[derive(Debug, Serialize)]
struct CreateFileRequest {
    title: String,
    workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<String>,
}

/// The folder field is always serialized; `null` moves the file to the
/// workspace root.
#[derive(Debug, Serialize)]
struct MoveFileRequest {
    folder_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SaveFileRequest {
    title: String,
    content: String,
}

/// [`SaveGateway`] that persists through the HTTP API, the same path the
/// server's own clients use.
struct RemoteGateway {
    client: ApiClient,
}

impl SaveGateway for RemoteGateway {
    async fn save_file(&self, file_id: &str, title: &str, content: &str) -> anyhow::Result<()> {
        let request = SaveFileRequest {
            title: title.to_string(),
            content: content.to_string(),
        };
        let _saved: FileWithRefs = self
            .client
            .patch(&format!("/files/{file_id}"), &request)
            .await?;
        Ok(())
    }
}

/// Drives one replacement body through the autosave engine and waits for the
/// outcome. Returns `false` when the content already matches the saved copy
/// and nothing was sent.
async fn push_through_engine<G: SaveGateway>(
    gateway: G,
    file: &File,
    content: String,
) -> anyhow::Result<bool> {
    let engine = AutosaveEngine::new(gateway);
    engine.load_file(
        file.id.clone(),
        file.title.clone(),
        file.content.clone(),
        EditorSettings {
            autosave_on: true,
            vim_on: false,
        },
    );
    engine.update_content(content);

    if !engine.has_changes() {
        return Ok(false);
    }

    engine.force_save().await;

    if engine.status() == SaveStatus::Error {
        anyhow::bail!("Save failed for '{}'. The edit was not applied.", file.title);
    }
    Ok(true)
}

pub async fn run_file_new(
    title: Option<String>,
    workspace: Option<String>,
    folder: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    // An absent folder means the workspace root; only resolve when named.
    let folder = match folder {
        Some(name) => pick_folder(&snapshot, Some(name), non_interactive)?,
        None => None,
    };

    let title = if let Some(t) = title {
        t
    } else if non_interactive {
        anyhow::bail!("A file title is required in non-interactive mode");
    } else {
        Text::new("File title:").prompt()?
    };

    let request = CreateFileRequest {
        title,
        workspace_id: snapshot.workspace.id.clone(),
        folder_id: folder.as_ref().map(|f| f.id.clone()),
    };
    let file: FileWithRefs = client.post("/files", &request).await?;

    println!();
    match &file.folder {
        Some(folder) => println!(
            "Created file '{}' in {}/{}",
            file.file.title, snapshot.workspace.name, folder.name
        ),
        None => println!(
            "Created file '{}' in {}",
            file.file.title, snapshot.workspace.name
        ),
    }
    println!();

    Ok(())
}

pub async fn run_file_cat(
    file: Option<String>,
    workspace: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let Some(file) = pick_file(&snapshot, file, non_interactive)? else {
        return Ok(());
    };

    print!("{}", file.content);
    if !file.content.ends_with('\n') {
        println!();
    }

    Ok(())
}

pub async fn run_file_move(
    file: Option<String>,
    folder: Option<String>,
    root: bool,
    workspace: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let Some(file) = pick_file(&snapshot, file, non_interactive)? else {
        return Ok(());
    };

    let target = if root {
        None
    } else {
        match pick_folder(&snapshot, folder, non_interactive)? {
            Some(folder) => Some(folder),
            None => return Ok(()),
        }
    };

    match plan_reparent(&file, target.as_ref().map(|f| f.id.as_str())) {
        ReparentPlan::AlreadyInPlace => {
            match &target {
                Some(folder) => println!(
                    "'{}' is already in folder '{}'. Nothing to do.",
                    file.title, folder.name
                ),
                None => println!(
                    "'{}' is already at the workspace root. Nothing to do.",
                    file.title
                ),
            }
            Ok(())
        }
        ReparentPlan::Move {
            file_id,
            target_folder_id,
        } => {
            let request = MoveFileRequest {
                folder_id: target_folder_id,
            };
            let moved: FileWithRefs = client
                .patch(&format!("/files/{file_id}"), &request)
                .await?;

            println!();
            match &moved.folder {
                Some(folder) => println!("Moved '{}' into '{}'", moved.file.title, folder.name),
                None => println!("Moved '{}' to the workspace root", moved.file.title),
            }
            println!();

            Ok(())
        }
    }
}

pub async fn run_file_delete(
    file: Option<String>,
    workspace: Option<String>,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let Some(file) = pick_file(&snapshot, file, non_interactive)? else {
        return Ok(());
    };

    let confirmed = confirm_action(
        &format!("Delete file '{}'?", file.title),
        yes,
        non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    client.delete(&format!("/files/{}", file.id)).await?;

    println!();
    println!("Deleted file '{}'", file.title);
    println!();

    Ok(())
}

pub async fn run_file_write(
    file: Option<String>,
    content: Option<String>,
    workspace: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let Some(file) = pick_file(&snapshot, file, non_interactive)? else {
        return Ok(());
    };

    let content = match content {
        Some(c) => c,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let gateway = RemoteGateway {
        client: client.clone(),
    };
    if !push_through_engine(gateway, &file, content).await? {
        println!("No changes to '{}'.", file.title);
        return Ok(());
    }

    println!();
    println!("Wrote '{}'", file.title);
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct AcceptingGateway;

    impl SaveGateway for AcceptingGateway {
        async fn save_file(
            &self,
            _file_id: &str,
            _title: &str,
            _content: &str,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct RejectingGateway;

    impl SaveGateway for RejectingGateway {
        async fn save_file(
            &self,
            _file_id: &str,
            _title: &str,
            _content: &str,
        ) -> anyhow::Result<()> {
            anyhow::bail!("persistence offline")
        }
    }

    fn sample_file(content: &str) -> File {
        let now = Utc::now();
        File {
            id: "file-1".to_string(),
            workspace_id: "ws-1".to_string(),
            folder_id: None,
            title: "Todo".to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_write_pushes_new_content() {
        let wrote = push_through_engine(AcceptingGateway, &sample_file(""), "buy milk".to_string())
            .await
            .unwrap();
        assert!(wrote);
    }

    #[tokio::test]
    async fn test_write_with_unchanged_content_sends_nothing() {
        // A rejecting gateway proves nothing reaches it.
        let wrote = push_through_engine(RejectingGateway, &sample_file("same"), "same".to_string())
            .await
            .unwrap();
        assert!(!wrote);
    }

    #[tokio::test]
    async fn test_failed_write_reports_edit_not_applied() {
        let err = push_through_engine(RejectingGateway, &sample_file(""), "buy milk".to_string())
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Save failed for 'Todo'"));
        assert!(message.contains("The edit was not applied"));
    }
}
