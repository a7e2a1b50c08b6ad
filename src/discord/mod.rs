//! Discord bot integration.

pub mod client;
pub mod commands;
pub mod directory;
pub mod handler;
pub mod links;
pub mod presence;
pub mod resolver;

pub use client::run_discord_daemon;
