// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `convoqa serve` command implementation.
//!
//! Runs the HTTP control surface until Ctrl+C or SIGTERM, then checkpoints
//! the warehouse.

use convoqa_core::ConvoqaError;
use convoqa_gateway::{GatewayState, ServerConfig};
use tracing::{info, warn};

use crate::runtime::Runtime;

pub async fn run_serve(runtime: Runtime) -> Result<(), ConvoqaError> {
    let server_config = ServerConfig {
        host: runtime.config.gateway.host.clone(),
        port: runtime.config.gateway.port,
    };
    let state = GatewayState {
        db: runtime.db.clone(),
        reconciler: runtime.reconciler.clone(),
        ingestor: runtime.ingestor.clone(),
        skip_ingestion: runtime.config.analysis.skip_ingestion,
        calendar: runtime.calendar.clone(),
        storage: runtime.storage.clone(),
        start_time: std::time::Instant::now(),
    };

    let result = tokio::select! {
        res = convoqa_gateway::start_server(&server_config, state) => res,
        _ = shutdown_signal() => Ok(()),
    };

    if let Err(e) = runtime.shutdown().await {
        warn!(error = %e, "warehouse shutdown failed");
    }
    info!("convoqa serve stopped");
    result
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                    _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler, waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received Ctrl+C, initiating shutdown");
    }
}
