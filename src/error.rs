//! Error types for Fetchcord.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// A remote resource could not be fetched, or is simply absent
    /// (e.g. a user without a banner).
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// An explicit identifier argument did not resolve to a user.
    /// Never produced by the invoker-fallback path.
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Web error: {0}")]
    Web(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn unavailable(s: impl Into<String>) -> Self {
        Error::ResourceUnavailable(s.into())
    }
}
