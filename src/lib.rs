//! # Sprout
//!
//! A multi-tenant notes server with debounced autosave, usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! sprout = { version = "0.0", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use sprout::auth::{PasswordManager, SessionKeys};
//! use sprout::server::{AppState, create_router};
//! use sprout::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/sprout.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState {
//!     store: Arc::new(store),
//!     session_keys: SessionKeys::new(b"session-signing-secret"),
//!     passwords: PasswordManager::new(),
//!     secure_cookies: false,
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! The client-side autosave engine lives in [`sync`] and is independent of
//! the server half; pair it with any [`sync::SaveGateway`] implementation.
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod sync;
pub mod types;
