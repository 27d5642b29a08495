// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-side row types.
//!
//! Entities shared across crates live in `convoqa-core::types` and are
//! re-exported here; the structs below only exist at the storage boundary.

use serde::{Deserialize, Serialize};

pub use convoqa_core::types::{
    AuditFact, Conversation, DailySnapshot, EvidenceQuote, Message, Staff, Tag, Ticket,
    TicketMetrics, TicketStatus,
};

/// Conversation fields owned by the ingestion side. Watermark fields are
/// deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHeader {
    pub id: String,
    pub page_id: Option<String>,
    pub customer_name: Option<String>,
    pub snippet: Option<String>,
    pub updated_at: Option<String>,
    pub full_json: Option<String>,
}

/// Everything one successful reconciliation writes, applied in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisCommit {
    pub fact: AuditFact,
    /// `message_count_total` as read when the candidate was selected.
    pub analyzed_message_count: i64,
    pub last_message_id: String,
    pub new_summary: String,
    /// Delta messages to flag as bot replies.
    pub auto_reply_message_ids: Vec<String>,
    pub risk_incident: Option<RiskIncident>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIncident {
    pub incident_id: String,
    pub conversation_id: String,
    pub risk_level: String,
    pub evidence: Vec<EvidenceQuote>,
    pub review_status: String,
    pub created_at: String,
}

/// One row of the calendar dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateDimension {
    pub date_key: i64,
    pub full_date: String,
    pub year: i32,
    pub quarter: u32,
    pub month: u32,
    pub week: u32,
    pub day: u32,
    /// 0 = Sunday.
    pub day_of_week: u32,
    pub is_weekend: bool,
}

/// Open, new and closed ticket counts for one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketCounts {
    pub open: i64,
    pub new: i64,
    pub closed: i64,
}
