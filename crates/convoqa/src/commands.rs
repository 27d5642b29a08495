// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `analyze`, `ingest`, `metrics`, `snapshot`.

use chrono::NaiveDate;
use convoqa_core::types::{BatchReport, DailySnapshot};
use convoqa_core::ConvoqaError;
use convoqa_pipeline::IngestReport;

use crate::runtime::Runtime;

pub async fn run_analyze(runtime: &Runtime) -> Result<BatchReport, ConvoqaError> {
    let report = runtime.analyze().await?;
    println!(
        "processed {} conversation(s): {} updated, {} skipped, {} failed",
        report.processed(),
        report.updated(),
        report.skipped(),
        report.failed()
    );
    for result in &report.results {
        match result.outcome.detail() {
            Some(detail) => println!("  {} {} ({detail})", result.conversation_id, result.outcome.label()),
            None => println!("  {} {}", result.conversation_id, result.outcome.label()),
        }
    }
    Ok(report)
}

pub async fn run_ingest(runtime: &Runtime) -> Result<Option<IngestReport>, ConvoqaError> {
    let report = runtime.ingest().await?;
    match &report {
        Some(r) => println!(
            "ingested {} conversation(s), {} message(s), {} tag(s); {} failed",
            r.conversations, r.messages, r.tags, r.failed
        ),
        None => println!("no record source configured; set ingestion.source_file"),
    }
    Ok(report)
}

pub async fn run_metrics(runtime: &Runtime) -> Result<usize, ConvoqaError> {
    let refreshed =
        convoqa_pipeline::recalculate_all_ticket_metrics(&runtime.db, &runtime.calendar).await?;
    println!("refreshed metrics for {refreshed} ticket(s)");
    Ok(refreshed)
}

/// Snapshots for `date`, or today in the business-local offset.
pub async fn run_snapshot(
    runtime: &Runtime,
    date: Option<NaiveDate>,
) -> Result<Vec<DailySnapshot>, ConvoqaError> {
    let date = date.unwrap_or_else(|| runtime.calendar.local_date(chrono::Utc::now()));
    let snapshots = convoqa_pipeline::calculate_all_daily_snapshots(&runtime.db, date).await?;
    for s in &snapshots {
        println!(
            "{}: open={} new={} closed={}",
            s.snapshot_id, s.open_tickets_count, s.new_tickets_count, s.closed_tickets_count
        );
    }
    Ok(snapshots)
}
