use std::fmt;

use chrono::{DateTime, Utc};
use inquire::{InquireError, Select};

use super::http_client::ApiClient;
use crate::types::{File, Folder, WorkspaceSnapshot};

/// Workspace with content counts for display
pub struct WorkspaceDisplay {
    pub snapshot: WorkspaceSnapshot,
}

impl fmt::Display for WorkspaceDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  ({} folder(s), {} file(s))",
            self.snapshot.workspace.name,
            self.snapshot.folders.len(),
            self.snapshot.files.len()
        )
    }
}

/// File with its folder name for display
pub struct FileDisplay {
    pub file: File,
    pub folder_name: Option<String>,
}

impl fmt::Display for FileDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.folder_name {
            Some(folder) => write!(f, "{}/{}", folder, self.file.title),
            None => write!(f, "{}", self.file.title),
        }
    }
}

/// Format a datetime as relative time (e.g., "2 days ago")
#[must_use]
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let diff = now.signed_duration_since(*dt);

    if diff.num_seconds() < 0 {
        return "in the future".to_string();
    }

    if diff.num_seconds() < 60 {
        return "just now".to_string();
    }

    if diff.num_minutes() < 60 {
        let mins = diff.num_minutes();
        return if mins == 1 {
            "1 minute ago".to_string()
        } else {
            format!("{mins} minutes ago")
        };
    }

    if diff.num_hours() < 24 {
        let hours = diff.num_hours();
        return if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{hours} hours ago")
        };
    }

    if diff.num_days() < 30 {
        let days = diff.num_days();
        return if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{days} days ago")
        };
    }

    if diff.num_days() < 365 {
        let months = diff.num_days() / 30;
        return if months == 1 {
            "1 month ago".to_string()
        } else {
            format!("{months} months ago")
        };
    }

    let years = diff.num_days() / 365;
    if years == 1 {
        "1 year ago".to_string()
    } else {
        format!("{years} years ago")
    }
}

/// Request confirmation for a destructive operation
pub fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(inquire::Confirm::new(message)
            .with_default(false)
            .prompt()?)
    }
}

fn select_one<T: fmt::Display>(prompt: &str, options: Vec<T>) -> anyhow::Result<Option<T>> {
    let selection = Select::new(prompt, options)
        .with_page_size(15)
        .with_help_message("Type to filter, Enter to select")
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(choice) => Ok(Some(choice)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolve a workspace by name, or pick one interactively. A lone workspace
/// is used without prompting.
pub async fn resolve_workspace(
    client: &ApiClient,
    name: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<Option<WorkspaceSnapshot>> {
    let mut workspaces: Vec<WorkspaceSnapshot> = client.get("/workspaces").await?;

    if workspaces.is_empty() {
        println!("No workspaces found.");
        return Ok(None);
    }

    if let Some(name) = name {
        return match workspaces.into_iter().find(|w| w.workspace.name == name) {
            Some(snapshot) => Ok(Some(snapshot)),
            None => anyhow::bail!("Workspace not found: {}", name),
        };
    }

    if workspaces.len() == 1 {
        return Ok(Some(workspaces.remove(0)));
    }

    if non_interactive {
        anyhow::bail!("--workspace is required in non-interactive mode");
    }

    let options: Vec<WorkspaceDisplay> = workspaces
        .into_iter()
        .map(|snapshot| WorkspaceDisplay { snapshot })
        .collect();
    Ok(select_one("Select workspace:", options)?.map(|display| display.snapshot))
}

/// Resolve a folder within a workspace by name, or pick one interactively.
pub fn pick_folder(
    snapshot: &WorkspaceSnapshot,
    name: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<Option<Folder>> {
    if let Some(name) = name {
        return match snapshot.folders.iter().find(|f| f.name == name) {
            Some(folder) => Ok(Some(folder.clone())),
            None => anyhow::bail!("Folder not found: {}", name),
        };
    }

    if snapshot.folders.is_empty() {
        println!(
            "No folders found in workspace '{}'.",
            snapshot.workspace.name
        );
        return Ok(None);
    }

    if non_interactive {
        anyhow::bail!("--folder is required in non-interactive mode");
    }

    let options: Vec<String> = snapshot.folders.iter().map(|f| f.name.clone()).collect();
    let Some(selected) = select_one("Select folder:", options)? else {
        return Ok(None);
    };

    Ok(snapshot.folders.iter().find(|f| f.name == selected).cloned())
}

/// Resolve a file within a workspace by title, or pick one interactively.
/// A bare title matches across all folders; the first match wins.
pub fn pick_file(
    snapshot: &WorkspaceSnapshot,
    title: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<Option<File>> {
    if let Some(title) = title {
        return match snapshot.files.iter().find(|f| f.title == title) {
            Some(file) => Ok(Some(file.clone())),
            None => anyhow::bail!("File not found: {}", title),
        };
    }

    if snapshot.files.is_empty() {
        println!(
            "No files found in workspace '{}'.",
            snapshot.workspace.name
        );
        return Ok(None);
    }

    if non_interactive {
        anyhow::bail!("A file title is required in non-interactive mode");
    }

    let options: Vec<FileDisplay> = snapshot
        .files
        .iter()
        .map(|file| FileDisplay {
            file: file.clone(),
            folder_name: file.folder_id.as_deref().and_then(|id| {
                snapshot
                    .folders
                    .iter()
                    .find(|f| f.id == id)
                    .map(|f| f.name.clone())
            }),
        })
        .collect();

    Ok(select_one("Select file:", options)?.map(|display| display.file))
}
