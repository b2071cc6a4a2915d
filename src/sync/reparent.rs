use crate::types::File;

/// Outcome of planning a drag-and-drop move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReparentPlan {
    /// The target matches the file's current location; no request is made.
    AlreadyInPlace,
    /// Persist the new parent through the gateway's partial file update.
    Move {
        file_id: String,
        target_folder_id: Option<String>,
    },
}

/// Plans moving a file into a folder, or to the workspace root when the
/// target is `None`. Dropping a file where it already lives short-circuits
/// before any network traffic. Whether the target folder exists and shares
/// the file's workspace is the gateway's check, not ours; on rejection
/// nothing was mutated locally, so the caller's view is still consistent.
#[must_use]
pub fn plan_reparent(file: &File, target_folder_id: Option<&str>) -> ReparentPlan {
    if file.folder_id.as_deref() == target_folder_id {
        return ReparentPlan::AlreadyInPlace;
    }

    ReparentPlan::Move {
        file_id: file.id.clone(),
        target_folder_id: target_folder_id.map(String::from),
    }
}
