//! Health check server using Axum.

use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{Error, Result};

use super::router::{create_app_router, AppState};

/// Run the health check server.
pub async fn run_web_server(state: AppState, port: u16) -> Result<()> {
    let app = create_app_router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", port)
        .parse()
        .map_err(|e| Error::Web(format!("Invalid address: {}", e)))?;

    tracing::info!("Health check server running on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Web(e.to_string()))?;

    Ok(())
}
