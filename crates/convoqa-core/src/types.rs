// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Warehouse domain types shared across adapter traits and pipeline stages.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies which slot an adapter fills.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Analyzer,
    Source,
}

// --- Operational entities ---

/// A conversation and its analysis watermark.
///
/// `last_analyzed_message_count` never exceeds `message_count_total`; the
/// watermark fields are only written by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub page_id: Option<String>,
    pub customer_name: Option<String>,
    pub snippet: Option<String>,
    pub updated_at: Option<String>,
    pub message_count_total: i64,
    pub last_analyzed_message_count: i64,
    pub last_analyzed_message_id: Option<String>,
    pub last_analyzed_at: Option<String>,
    pub context_summary: String,
}

impl Conversation {
    /// Messages observed but not yet covered by the watermark.
    pub fn unanalyzed_count(&self) -> i64 {
        self.message_count_total - self.last_analyzed_message_count
    }
}

/// A single stored message. Ordered within its conversation by
/// `inserted_at`, ties broken by insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: Option<String>,
    pub sender_name: String,
    pub content: String,
    pub inserted_at: String,
    pub is_from_shop: bool,
    pub is_auto_reply: bool,
    /// Upstream record as received, when ingested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_json: Option<String>,
}

// --- Dimensions ---

/// A platform tag from the tag dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub page_id: Option<String>,
}

impl Tag {
    pub fn to_ref(&self) -> TagRef {
        TagRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// The `{id, name}` projection of a tag sent to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: String,
    pub name: String,
}

/// A staff member from the staff dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub staff_key: String,
    pub staff_name: String,
    pub is_active: bool,
}

impl Staff {
    /// Derives the dimension key for a display name (`"Anna Le"` → `staff_anna_le`).
    pub fn key_for(name: &str) -> String {
        let slug = name
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        format!("staff_{slug}")
    }
}

// --- Facts ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Open,
    Closed,
}

/// Derived time and count measures of a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMetrics {
    pub first_response_minutes: Option<i64>,
    pub resolution_minutes: Option<i64>,
    pub is_first_contact_resolution: bool,
    pub auto_reply_count: i64,
    pub human_response_count: i64,
}

/// A bounded span `[start_message_id, end_message_id]` of one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub conversation_id: String,
    pub staff_key: Option<String>,
    pub status: TicketStatus,
    pub start_message_id: Option<String>,
    pub end_message_id: Option<String>,
    pub created_at: String,
    pub closed_at: Option<String>,
    pub created_date_key: Option<i64>,
    pub closed_date_key: Option<i64>,
    pub metrics: TicketMetrics,
}

/// One quoted piece of evidence backing a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceQuote {
    pub category: String,
    pub quote: String,
}

/// Latest analyzer verdict for a conversation. Overwritten on every
/// reconciliation, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFact {
    pub conversation_id: String,
    pub sentiment_label: String,
    pub risk_level: String,
    pub rep_quality: String,
    pub user_intent: String,
    pub audit_evidence: Vec<EvidenceQuote>,
    pub analyzed_through_message_id: Option<String>,
    pub updated_at: String,
}

/// Daily open/new/closed ticket counts for one date, optionally per staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub snapshot_id: String,
    pub date_key: i64,
    pub staff_key: Option<String>,
    pub open_tickets_count: i64,
    pub new_tickets_count: i64,
    pub closed_tickets_count: i64,
    pub calculated_at: String,
}

// --- Analyzer wire types ---

/// Body sent to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub transcript_delta: String,
    pub previous_summary: String,
    pub available_tags: Vec<TagRef>,
}

/// Structured verdict returned by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub sentiment_label: String,
    pub risk_level: String,
    pub rep_quality: String,
    pub user_intent: String,
    pub audit_evidence: Vec<EvidenceQuote>,
    pub new_summary: String,
    /// Staff messages in the delta the analyzer classified as bot replies.
    #[serde(default)]
    pub auto_reply_message_ids: Vec<String>,
}

impl Verdict {
    /// Whether the risk level warrants a review incident.
    pub fn is_elevated_risk(&self) -> bool {
        matches!(
            self.risk_level.trim().to_ascii_lowercase().as_str(),
            "medium" | "high" | "critical"
        )
    }
}

// --- Reconciliation results ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The delta was empty; only the watermark count moved.
    NoNewMessages,
    /// Dry-run mode; nothing was sent or written.
    DryRun,
}

/// Terminal state of one candidate in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Skipped(SkipReason),
    Updated,
    Failed(String),
}

impl ReconcileOutcome {
    /// Short label used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped(_) => "skipped",
            Self::Updated => "updated",
            Self::Failed(_) => "failed",
        }
    }

    /// Human-readable detail, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Skipped(reason) => Some(reason.to_string()),
            Self::Updated => None,
            Self::Failed(err) => Some(err.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResult {
    pub conversation_id: String,
    pub outcome: ReconcileOutcome,
}

/// Per-candidate outcomes of one reconciliation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<CandidateResult>,
}

impl BatchReport {
    /// Number of candidates selected, regardless of outcome.
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, ReconcileOutcome::Updated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ReconcileOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ReconcileOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ReconcileOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

// --- Raw upstream records ---

/// A conversation header as returned by the upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConversation {
    pub id: String,
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub inserted_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub customers: Vec<RawCustomer>,
    #[serde(default)]
    pub tags: Vec<RawTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCustomer {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTag {
    pub id: serde_json::Value,
    pub text: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl RawTag {
    /// Upstream tag ids are numeric but stored as text.
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// A message as returned by the upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub message: String,
    pub from: RawSender,
    pub inserted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSender {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub admin_id: Option<String>,
}

impl RawSender {
    /// Staff-originated when sent by a page admin or by the page itself.
    pub fn is_from_shop(&self, page_id: Option<&str>) -> bool {
        self.admin_id.is_some()
            || matches!((self.id.as_deref(), page_id), (Some(id), Some(page)) if id == page)
    }
}
