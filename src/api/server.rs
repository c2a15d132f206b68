//! HTTP server exposing the pipeline as a JSON endpoint.

use anyhow::{Context, Result};
use axum::Router;
use colored::Colorize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::routes::{self, AppState};
use crate::runner::Orchestrator;

/// Server configuration
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9334,
        }
    }
}

/// Main API server
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ServerConfig, orchestrator: Orchestrator) -> Self {
        Self {
            config,
            state: Arc::new(AppState { orchestrator }),
        }
    }

    /// Router with all endpoints and CORS applied
    pub fn router(&self) -> Router {
        routes::api_router()
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the server and block until Ctrl+C
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.config.host, self.config.port
                )
            })?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        println!("\n{} AI test agent listening", "🚀".green());
        println!("   POST http://{}/api/run-test", addr);
        println!("   GET  http://{}/api/health", addr);
        println!("\n   Press Ctrl+C to stop.\n");

        axum::serve(listener, self.router().into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log::info!("Server on {} stopped", addr);
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
    }
}
