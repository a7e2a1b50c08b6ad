//! Fetchcord library root.

pub mod card;
pub mod cli;
pub mod config;
pub mod discord;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod web;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use discord::run_discord_daemon;
pub use error::{Error, Result};
pub use model::{Attachment, Invocation, InvocationKind, MembershipRef, UserRef};
pub use web::run_web_server;
