// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental analysis pipeline for the Convoqa warehouse.
//!
//! Candidate Selector → Delta Extractor → Analysis Reconciler, plus the
//! ticket metrics and daily snapshot aggregators that run over the same
//! message store using the [`WorkingCalendar`].

pub mod calendar;
pub mod delta;
pub mod ingest;
pub mod metrics;
pub mod reconciler;
pub mod selector;
pub mod snapshot;

pub use calendar::WorkingCalendar;
pub use delta::{Delta, compute_delta};
pub use ingest::{IngestReport, Ingestor, JsonFileSource};
pub use metrics::{
    calculate_ticket_metrics, recalculate_all_ticket_metrics, ticket_span, update_ticket_metrics,
};
pub use reconciler::{Reconciler, ReconcilerOptions};
pub use selector::select_candidates;
pub use snapshot::{calculate_all_daily_snapshots, calculate_daily_snapshot};
