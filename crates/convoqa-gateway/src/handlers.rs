// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the control surface.
//!
//! Handles POST /control/analyze (alias /trigger-analysis),
//! POST /control/ticket-metrics, POST /control/snapshots and GET /health.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use convoqa_core::types::{BatchReport, DailySnapshot, HealthStatus};
use convoqa_core::PluginAdapter;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::server::GatewayState;

/// Query parameters for the analysis trigger.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    /// Include per-conversation outcomes in the response.
    #[serde(default)]
    pub report: bool,
}

/// Response body for a successful analysis trigger.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    /// Candidates handled in this batch, whatever their outcome.
    pub processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<CandidateReport>>,
}

/// One row of the optional per-conversation report.
#[derive(Debug, Serialize)]
pub struct CandidateReport {
    pub conversation_id: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TicketMetricsResponse {
    pub status: &'static str,
    pub refreshed: usize,
}

/// Request body for POST /control/snapshots.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotRequest {
    /// `YYYY-MM-DD`; defaults to today in the business-local offset.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub status: &'static str,
    pub snapshots: Vec<DailySnapshot>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn error_response(status: StatusCode, error: &str, details: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details: Some(details.to_string()),
        }),
    )
        .into_response()
}

fn to_reports(report: &BatchReport) -> Vec<CandidateReport> {
    report
        .results
        .iter()
        .map(|r| CandidateReport {
            conversation_id: r.conversation_id.clone(),
            outcome: r.outcome.label(),
            detail: r.outcome.detail(),
        })
        .collect()
}

/// POST /control/analyze, POST /trigger-analysis
///
/// Runs ingestion (unless skipped or unconfigured), then one analysis batch.
pub async fn post_analyze(
    State(state): State<GatewayState>,
    Query(params): Query<AnalyzeParams>,
) -> Response {
    if !state.skip_ingestion
        && let Some(ingestor) = &state.ingestor
        && let Err(e) = ingestor.run().await
    {
        error!(error = %e, "ingestion failed");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Ingestion failed", e);
    }

    match state.reconciler.run_batch().await {
        Ok(report) => {
            info!(processed = report.processed(), "analysis triggered");
            (
                StatusCode::OK,
                Json(AnalyzeResponse {
                    status: "ok",
                    processed: report.processed(),
                    results: params.report.then(|| to_reports(&report)),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "analysis batch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Analysis failed", e)
        }
    }
}

/// POST /control/ticket-metrics
pub async fn post_ticket_metrics(State(state): State<GatewayState>) -> Response {
    match convoqa_pipeline::recalculate_all_ticket_metrics(&state.db, &state.calendar).await {
        Ok(refreshed) => (
            StatusCode::OK,
            Json(TicketMetricsResponse {
                status: "ok",
                refreshed,
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "ticket metrics refresh failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Ticket metrics failed", e)
        }
    }
}

/// POST /control/snapshots
pub async fn post_snapshots(
    State(state): State<GatewayState>,
    body: Option<Json<SnapshotRequest>>,
) -> Response {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let date = match request.date.as_deref() {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, "Invalid date", e),
        },
        None => state.calendar.local_date(chrono::Utc::now()),
    };

    match convoqa_pipeline::calculate_all_daily_snapshots(&state.db, date).await {
        Ok(snapshots) => (
            StatusCode::OK,
            Json(SnapshotResponse {
                status: "ok",
                snapshots,
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, %date, "snapshot calculation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Snapshot failed", e)
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (code, status, detail) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy", None),
        Ok(HealthStatus::Degraded(d)) => (StatusCode::OK, "degraded", Some(d)),
        Ok(HealthStatus::Unhealthy(d)) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(d)),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(e.to_string())),
    };
    (
        code,
        Json(HealthResponse {
            status,
            detail,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
        .into_response()
}
