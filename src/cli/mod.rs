//! CLI for Fetchcord using clap.

use anyhow::Result;
use clap::Parser;

use crate::config::load_settings;
use crate::discord::run_discord_daemon;
use crate::web::run_web_server;

/// Fetchcord - Discord profile & file bot.
#[derive(Parser)]
#[command(name = "fetchcord")]
#[command(version = "0.1.0")]
#[command(about = "Discord avatar, banner and profile bot", long_about = None)]
pub struct Commands {
    /// Discord bot token (overrides settings file)
    #[arg(long, env = "DISCORD_TOKEN")]
    pub token: Option<String>,

    /// Health check server port (overrides settings file)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

impl Commands {
    /// Start the bot and the health check server.
    pub async fn run(self) -> Result<()> {
        let mut settings = load_settings_or_env(self.token)?;

        if let Some(port) = self.port {
            settings.web.port = port;
        }

        let health = crate::web::AppState::new();

        // Health server runs alongside the gateway connection; its failure
        // is logged but never takes the bot down.
        let web_state = health.clone();
        let web_port = settings.web.port;
        tokio::spawn(async move {
            if let Err(e) = run_web_server(web_state, web_port).await {
                tracing::error!("Health server error: {}", e);
            }
        });

        run_discord_daemon(settings, health).await?;
        Ok(())
    }
}

fn load_settings_or_env(token: Option<String>) -> Result<crate::config::Settings> {
    match load_settings() {
        Ok(mut settings) => {
            if let Some(token) = token {
                settings.discord.token = Some(token);
            }
            Ok(settings)
        }
        Err(e) => {
            // A token flag alone is enough to run without a settings file.
            if let Some(token) = token {
                let mut settings = crate::config::Settings::default();
                settings.discord.token = Some(token);
                Ok(settings)
            } else {
                Err(e.into())
            }
        }
    }
}
