// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use convoqa_core::{ConvoqaError, StorageAdapter};
use convoqa_pipeline::{Ingestor, Reconciler, WorkingCalendar};
use convoqa_storage::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub db: Database,
    pub reconciler: Arc<Reconciler>,
    /// `None` when no record source is configured.
    pub ingestor: Option<Arc<Ingestor>>,
    pub skip_ingestion: bool,
    pub calendar: Arc<WorkingCalendar>,
    pub storage: Arc<dyn StorageAdapter + Send + Sync>,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors `GatewayConfig` from convoqa-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// All control routes with CORS and request tracing applied.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/control/analyze", post(handlers::post_analyze))
        .route("/trigger-analysis", post(handlers::post_analyze))
        .route("/control/ticket-metrics", post(handlers::post_ticket_metrics))
        .route("/control/snapshots", post(handlers::post_snapshots))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the listener fails.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), ConvoqaError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConvoqaError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ConvoqaError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
