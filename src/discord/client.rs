//! Discord client lifecycle: login retries, shutdown, heartbeat logging.

use std::time::Duration;

use serenity::client::Client;
use serenity::model::gateway::GatewayIntents;
use tokio::time::sleep;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::web::AppState;

use super::directory::ProfileApi;
use super::handler::Handler;

/// Interval between heartbeat log lines.
const HEARTBEAT_PERIOD: Duration = Duration::from_secs(300);

/// Run the bot until the gateway connection shuts down.
pub async fn run_discord_daemon(settings: Settings, health: AppState) -> Result<()> {
    let token = settings
        .discord
        .token
        .clone()
        .ok_or_else(|| Error::Config("No bot token configured".to_string()))?;

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::DIRECT_MESSAGES;

    let handler = Handler::new(settings.clone(), health.clone(), ProfileApi::new(&token));

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    // Graceful shutdown: close all shards on SIGINT or SIGTERM.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("Shutdown signal received, shutting down gracefully...");
        shard_manager.shutdown_all().await;
    });

    // Periodic liveness line in the logs.
    let heartbeat_health = health.clone();
    tokio::spawn(async move {
        loop {
            sleep(HEARTBEAT_PERIOD).await;
            let uptime = heartbeat_health
                .start_time
                .elapsed()
                .unwrap_or_default()
                .as_secs();
            let state = if heartbeat_health.is_connected().await {
                "connected"
            } else {
                "disconnected"
            };
            tracing::info!("Heartbeat - alive, uptime {}s, gateway {}", uptime, state);
        }
    });

    // Bounded login retries with a fixed delay, then terminal failure.
    let max_retries = settings.discord.login_max_retries.max(1);
    let retry_delay = Duration::from_secs(settings.discord.login_retry_delay_secs);

    for attempt in 1..=max_retries {
        tracing::info!("Connecting to Discord (attempt {}/{})", attempt, max_retries);
        match client.start().await {
            Ok(()) => {
                tracing::info!("Discord client stopped");
                return Ok(());
            }
            Err(e) => {
                tracing::error!("Login attempt {} failed: {}", attempt, e);
                if attempt == max_retries {
                    tracing::error!("Max login retries reached. Exiting...");
                    return Err(e.into());
                }
                tracing::info!("Retrying login in {}s...", retry_delay.as_secs());
                sleep(retry_delay).await;
            }
        }
    }

    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
