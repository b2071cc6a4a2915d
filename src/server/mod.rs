mod access;
pub mod dto;
mod files;
mod folders;
pub mod response;
mod router;
mod session;
mod settings;
mod users;
pub mod validation;
mod workspaces;

pub use router::{AppState, create_router};
