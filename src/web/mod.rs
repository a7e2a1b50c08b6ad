//! Health check web server (Axum).

pub mod router;
pub mod server;

pub use router::AppState;
pub use server::run_web_server;
