// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Convoqa.
//!
//! Holds the error type, the warehouse domain types shared by every crate,
//! and the adapter traits implemented by storage, analyzer, and record-source
//! backends.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ConvoqaError;
pub use types::{
    AdapterType, AnalysisRequest, AuditFact, BatchReport, CandidateResult, Conversation,
    DailySnapshot, EvidenceQuote, HealthStatus, Message, RawConversation, RawCustomer, RawMessage,
    RawSender, RawTag, ReconcileOutcome, SkipReason, Staff, Tag, TagRef, Ticket, TicketMetrics,
    TicketStatus, Verdict,
};

pub use traits::{AnalyzerAdapter, PluginAdapter, RecordSource, StorageAdapter};
