//! Configuration loading for Fetchcord.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Get the Fetchcord home directory (~/.fetchcord).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".fetchcord"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.fetchcord/settings.json, then apply environment
/// overrides. The settings file is optional; the token is not.
pub fn load_settings() -> Result<Settings> {
    let path = get_settings_path()?;
    let mut settings = load_settings_from(&path)?;
    apply_env_overrides(&mut settings);
    validate_settings(&settings)?;
    Ok(settings)
}

fn load_settings_from(path: &PathBuf) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(
        settings,
        std::env::var("DISCORD_TOKEN").ok(),
        std::env::var("PORT").ok(),
    );
}

/// Environment values win over file values; empty or unparseable values
/// leave the file values in place.
fn apply_overrides(settings: &mut Settings, token: Option<String>, port: Option<String>) {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        settings.discord.token = Some(token);
    }
    if let Some(port) = port.and_then(|p| p.parse().ok()) {
        settings.web.port = port;
    }
}

fn validate_settings(settings: &Settings) -> Result<()> {
    match &settings.discord.token {
        Some(t) if !t.is_empty() => Ok(()),
        _ => Err(Error::Config(
            "No Discord bot token configured. Set DISCORD_TOKEN or add it to settings.json."
                .to_string(),
        )),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub discord: DiscordSettings,
    #[serde(default)]
    pub web: WebSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordSettings {
    /// Bot token from the developer portal.
    pub token: Option<String>,
    /// Text-command marker character.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Seconds between presence rotations.
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
    /// Delay before the first rotation after ready.
    #[serde(default = "default_status_delay")]
    pub status_initial_delay_secs: u64,
    /// Bounded login retries before giving up.
    #[serde(default = "default_login_retries")]
    pub login_max_retries: u32,
    /// Fixed delay between login attempts.
    #[serde(default = "default_login_delay")]
    pub login_retry_delay_secs: u64,
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            token: None,
            prefix: default_prefix(),
            status_interval_secs: default_status_interval(),
            status_initial_delay_secs: default_status_delay(),
            login_max_retries: default_login_retries(),
            login_retry_delay_secs: default_login_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSettings {
    /// Health check server port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_status_interval() -> u64 {
    30
}

fn default_status_delay() -> u64 {
    10
}

fn default_login_retries() -> u32 {
    3
}

fn default_login_delay() -> u64 {
    5
}

fn default_port() -> u16 {
    3000
}
