//! Vidshare Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod error;
pub mod server;
pub mod sqlite_persistence;
pub mod user;
pub mod video;

// Re-export commonly used types for convenience
pub use error::{ServiceError, ServiceResult};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{Role, SqliteUserStore, TokenService, UserStore};
pub use video::{FullVideoStore, SqliteVideoStore};
