//! Route definitions for the health check server.

use std::sync::Arc;
use std::time::SystemTime;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Health check response for uptime monitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime: u64,
    pub timestamp: String,
    pub bot_status: String,
}

/// Shared state between the gateway handler and the health server.
#[derive(Clone)]
pub struct AppState {
    pub start_time: SystemTime,
    pub bot_username: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            start_time: SystemTime::now(),
            bot_username: Arc::new(RwLock::new(None)),
        }
    }

    /// Record the logged-in bot identity once the gateway is ready.
    pub async fn set_bot_username(&self, username: String) {
        let mut guard = self.bot_username.write().await;
        *guard = Some(username);
    }

    pub async fn is_connected(&self) -> bool {
        self.bot_username.read().await.is_some()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    let uptime = state.start_time.elapsed().unwrap_or_default().as_secs();
    let bot_status = if state.is_connected().await {
        "Connected"
    } else {
        "Disconnected"
    };

    Json(HealthStatus {
        status: "Bot is running!".to_string(),
        uptime,
        timestamp: chrono::Utc::now().to_rfc3339(),
        bot_status: bot_status.to_string(),
    })
}

async fn ping_handler() -> &'static str {
    "Pong! Bot is alive 🚀"
}

/// Create the health check router.
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/ping", get(ping_handler))
        .with_state(state)
}
