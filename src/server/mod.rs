pub mod access;
mod comment_routes;
pub mod config;
mod http_layers;
pub mod metrics;
pub mod server;
mod session;
pub mod state;
mod video_routes;
mod watch_later_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use session::Session;
