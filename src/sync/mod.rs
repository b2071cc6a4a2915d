mod autosave;
mod reparent;
mod tree;

pub use autosave::{AutosaveEngine, SaveGateway, SaveStatus};
pub use reparent::{ReparentPlan, plan_reparent};
pub use tree::{WorkspaceTree, project};
