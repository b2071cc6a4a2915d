use super::credentials::load_credentials;
use super::http_client::ApiClient;
use super::pickers::resolve_workspace;
use crate::sync::{WorkspaceTree, project};

pub async fn run_ls(workspace: Option<String>, non_interactive: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let Some(snapshot) = resolve_workspace(&client, workspace, non_interactive).await? else {
        return Ok(());
    };

    let tree = project(&snapshot);

    println!();
    println!("{}/", snapshot.workspace.name);
    render_tree(&tree);

    let file_count = snapshot.files.len();
    println!();
    println!(
        "{} folder(s), {} file(s) total",
        tree.folders.len(),
        file_count
    );
    println!();

    Ok(())
}

/// Folders with their children first, then loose files, the same order the
/// projection yields.
fn render_tree(tree: &WorkspaceTree) {
    for folder in &tree.folders {
        println!("  {}/", folder.folder.name);
        for file in &folder.files {
            println!("    {}", file.title);
        }
    }
    for file in &tree.loose_files {
        println!("  {}", file.title);
    }
}
