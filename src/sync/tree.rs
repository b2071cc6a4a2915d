use std::collections::HashMap;

use crate::types::{File, FileWithRefs, FolderWithFiles, WorkspaceSnapshot};

/// Display-ready projection of one workspace: folders with their child files
/// first, then loose files, plus an id-keyed index of every file with its
/// workspace and folder back-references filled in.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceTree {
    pub folders: Vec<FolderWithFiles>,
    pub loose_files: Vec<File>,
    pub files_by_id: HashMap<String, FileWithRefs>,
}

/// Builds the tree from a flat workspace snapshot.
///
/// Files are partitioned by `folder_id`: each folder carries exactly the
/// files that point at it, loose files are those with no folder. Ordering
/// within each list follows the snapshot, which the gateway returns in
/// creation order. Every file lands in exactly one place and appears in the
/// index exactly once.
#[must_use]
pub fn project(snapshot: &WorkspaceSnapshot) -> WorkspaceTree {
    let mut folders = Vec::with_capacity(snapshot.folders.len());
    for folder in &snapshot.folders {
        let files: Vec<File> = snapshot
            .files
            .iter()
            .filter(|f| f.folder_id.as_deref() == Some(folder.id.as_str()))
            .cloned()
            .collect();
        folders.push(FolderWithFiles {
            folder: folder.clone(),
            files,
        });
    }

    let loose_files: Vec<File> = snapshot
        .files
        .iter()
        .filter(|f| f.folder_id.is_none())
        .cloned()
        .collect();

    let mut files_by_id = HashMap::with_capacity(snapshot.files.len());
    for file in &snapshot.files {
        let folder = file
            .folder_id
            .as_ref()
            .and_then(|id| snapshot.folders.iter().find(|f| &f.id == id))
            .cloned();
        files_by_id.insert(
            file.id.clone(),
            FileWithRefs {
                file: file.clone(),
                workspace: snapshot.workspace.clone(),
                folder,
            },
        );
    }

    WorkspaceTree {
        folders,
        loose_files,
        files_by_id,
    }
}
