//! Fetchcord - Discord profile & file bot.
//!
//! Fetches avatars, banners and profile cards on command, re-uploads CDN
//! file links, and keeps a rotating presence while a health endpoint
//! reports liveness.

use clap::Parser;
use std::process::ExitCode;

mod card;
mod cli;
mod config;
mod discord;
mod error;
mod fetch;
mod logging;
mod model;
mod web;

use cli::Commands;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; keep the guard alive for the process lifetime.
    let _guard = match logging::init() {
        Ok((guard, _log_dir)) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let args = Commands::parse();

    match args.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
