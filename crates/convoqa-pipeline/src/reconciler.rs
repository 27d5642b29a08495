// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analysis reconciler.
//!
//! Drives each candidate conversation through one pass of
//! delta → analyzer → commit, ending in exactly one of
//! [`ReconcileOutcome::Skipped`], [`ReconcileOutcome::Updated`] or
//! [`ReconcileOutcome::Failed`]. Candidates are processed strictly one at a
//! time; a failure on one never aborts the rest of the batch.

use std::sync::Arc;

use convoqa_core::traits::AnalyzerAdapter;
use convoqa_core::types::{
    AnalysisRequest, AuditFact, BatchReport, CandidateResult, Conversation, ReconcileOutcome,
    SkipReason, TagRef, Verdict,
};
use convoqa_core::ConvoqaError;
use convoqa_storage::database::now_timestamp;
use convoqa_storage::models::{AnalysisCommit, RiskIncident};
use convoqa_storage::queries::{audit, conversations, dimensions, messages};
use convoqa_storage::Database;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::delta::{Delta, compute_delta};
use crate::selector::select_candidates;

/// Review status given to freshly recorded risk incidents.
const PENDING_REVIEW: &str = "Pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerOptions {
    pub threshold: u32,
    pub dry_run: bool,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            threshold: 25,
            dry_run: false,
        }
    }
}

pub struct Reconciler {
    db: Database,
    analyzer: Arc<dyn AnalyzerAdapter + Send + Sync>,
    options: ReconcilerOptions,
    batch_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(
        db: Database,
        analyzer: Arc<dyn AnalyzerAdapter + Send + Sync>,
        options: ReconcilerOptions,
    ) -> Self {
        Self {
            db,
            analyzer,
            options,
            batch_lock: Mutex::new(()),
        }
    }

    pub fn options(&self) -> ReconcilerOptions {
        self.options
    }

    /// Run one batch: select candidates, then reconcile each in id order.
    ///
    /// Concurrent calls queue behind each other. Only a failed candidate scan
    /// or tag snapshot returns `Err`; per-conversation failures are reported
    /// in the [`BatchReport`].
    pub async fn run_batch(&self) -> Result<BatchReport, ConvoqaError> {
        let _guard = self.batch_lock.lock().await;

        let candidates = select_candidates(&self.db, self.options.threshold)
            .await
            .inspect_err(|e| error!(error = %e, "candidate scan failed"))?;
        info!(
            threshold = self.options.threshold,
            candidates = candidates.len(),
            dry_run = self.options.dry_run,
            "analysis batch started"
        );

        let mut report = BatchReport::default();
        if candidates.is_empty() {
            return Ok(report);
        }

        let tags: Vec<TagRef> = dimensions::list_tags(&self.db)
            .await
            .inspect_err(|e| error!(error = %e, "tag snapshot failed"))?
            .iter()
            .map(|t| t.to_ref())
            .collect();

        for conversation in &candidates {
            let outcome = self.reconcile(conversation, &tags).await;
            report.results.push(CandidateResult {
                conversation_id: conversation.id.clone(),
                outcome,
            });
        }

        info!(
            processed = report.processed(),
            updated = report.updated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "analysis batch finished"
        );
        Ok(report)
    }

    /// Reconcile a single candidate. Never returns an error: failures become
    /// [`ReconcileOutcome::Failed`].
    pub async fn reconcile(&self, conversation: &Conversation, tags: &[TagRef]) -> ReconcileOutcome {
        match self.try_reconcile(conversation, tags).await {
            Ok(outcome) => {
                debug!(
                    conversation_id = %conversation.id,
                    status = outcome.label(),
                    "candidate reconciled"
                );
                outcome
            }
            Err(e) => {
                warn!(conversation_id = %conversation.id, error = %e, "analysis failed");
                ReconcileOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_reconcile(
        &self,
        conversation: &Conversation,
        tags: &[TagRef],
    ) -> Result<ReconcileOutcome, ConvoqaError> {
        let history = messages::get_messages_for_conversation(&self.db, &conversation.id).await?;

        let Some(delta) = compute_delta(&history, conversation.last_analyzed_message_id.as_deref())
        else {
            conversations::advance_analyzed_count(
                &self.db,
                &conversation.id,
                conversation.message_count_total,
            )
            .await?;
            return Ok(ReconcileOutcome::Skipped(SkipReason::NoNewMessages));
        };

        if self.options.dry_run {
            info!(
                conversation_id = %conversation.id,
                delta_messages = delta.len(),
                delta_chars = delta.text.len(),
                "dry run: would send delta to analyzer"
            );
            return Ok(ReconcileOutcome::Skipped(SkipReason::DryRun));
        }

        let request = AnalysisRequest {
            transcript_delta: delta.text.clone(),
            previous_summary: conversation.context_summary.clone(),
            available_tags: tags.to_vec(),
        };
        let verdict = self.analyzer.analyze(&request).await?;

        audit::commit_analysis(&self.db, build_commit(conversation, &delta, verdict)).await?;
        Ok(ReconcileOutcome::Updated)
    }
}

/// Everything a successful verdict writes back, with the watermark taken
/// from the selection-time `message_count_total`.
fn build_commit(conversation: &Conversation, delta: &Delta, verdict: Verdict) -> AnalysisCommit {
    let now = now_timestamp();

    let risk_incident = verdict.is_elevated_risk().then(|| RiskIncident {
        incident_id: format!("risk_{}_{}", conversation.id, delta.last_message_id),
        conversation_id: conversation.id.clone(),
        risk_level: verdict.risk_level.clone(),
        evidence: verdict.audit_evidence.clone(),
        review_status: PENDING_REVIEW.to_string(),
        created_at: now.clone(),
    });

    let auto_reply_message_ids = verdict
        .auto_reply_message_ids
        .into_iter()
        .filter(|id| delta.contains(id))
        .collect();

    AnalysisCommit {
        fact: AuditFact {
            conversation_id: conversation.id.clone(),
            sentiment_label: verdict.sentiment_label,
            risk_level: verdict.risk_level,
            rep_quality: verdict.rep_quality,
            user_intent: verdict.user_intent,
            audit_evidence: verdict.audit_evidence,
            analyzed_through_message_id: Some(delta.last_message_id.clone()),
            updated_at: now,
        },
        analyzed_message_count: conversation.message_count_total,
        last_message_id: delta.last_message_id.clone(),
        new_summary: verdict.new_summary,
        auto_reply_message_ids,
        risk_incident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoqa_test_utils::{MockAnalyzer, TestHarness, verdict};

    fn reconciler(h: &TestHarness, threshold: u32, dry_run: bool) -> Reconciler {
        Reconciler::new(
            h.db.clone(),
            h.analyzer.clone(),
            ReconcilerOptions { threshold, dry_run },
        )
    }

    async fn conversation(h: &TestHarness, id: &str) -> Conversation {
        conversations::get_conversation(&h.db, id)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn below_threshold_is_not_a_candidate() {
        let h = TestHarness::new().await.unwrap();
        h.seed_conversation("c1", 10).await.unwrap();
        let report = reconciler(&h, 25, false).run_batch().await.unwrap();
        assert_eq!(report.processed(), 0);
        assert_eq!(h.analyzer.call_count().await, 0);
    }

    #[tokio::test]
    async fn sends_full_history_with_previous_summary_and_tags() {
        let h = TestHarness::new().await.unwrap();
        h.seed_tags(&["refund", "vip"]).await.unwrap();
        h.seed_conversation("c1", 3).await.unwrap();

        let report = reconciler(&h, 1, false).run_batch().await.unwrap();
        assert_eq!(report.updated(), 1);

        let requests = h.analyzer.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].transcript_delta.lines().count(), 3);
        assert_eq!(requests[0].previous_summary, "");
        assert_eq!(requests[0].available_tags.len(), 2);
    }

    #[tokio::test]
    async fn second_pass_sends_only_new_messages() {
        let h = TestHarness::new().await.unwrap();
        let mut all = TestHarness::messages("c1", 6);
        let later = all.split_off(4);
        h.persist("c1", all).await.unwrap();

        let r = reconciler(&h, 1, false);
        h.analyzer.push_verdict(verdict("S1")).await;
        r.run_batch().await.unwrap();

        h.persist("c1", later).await.unwrap();
        h.analyzer.push_verdict(verdict("S2")).await;
        r.run_batch().await.unwrap();

        let requests = h.analyzer.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].previous_summary, "S1");
        assert_eq!(requests[1].transcript_delta.lines().count(), 2);
        assert!(requests[1].transcript_delta.contains("c1-m005"));

        let conv = conversation(&h, "c1").await;
        assert_eq!(conv.last_analyzed_message_count, 6);
        assert_eq!(conv.last_analyzed_message_id.as_deref(), Some("c1-m005"));
        assert_eq!(conv.context_summary, "S2");
    }

    #[tokio::test]
    async fn empty_delta_advances_count_without_analyzer_call() {
        let h = TestHarness::new().await.unwrap();
        h.seed_conversation("c1", 2).await.unwrap();
        let r = reconciler(&h, 0, false);
        r.run_batch().await.unwrap();
        assert_eq!(h.analyzer.call_count().await, 1);

        let report = r.run_batch().await.unwrap();
        assert_eq!(report.processed(), 1);
        assert_eq!(
            report.results[0].outcome,
            ReconcileOutcome::Skipped(SkipReason::NoNewMessages)
        );
        assert_eq!(h.analyzer.call_count().await, 1);
    }

    #[tokio::test]
    async fn empty_conversation_is_skipped() {
        let h = TestHarness::new().await.unwrap();
        h.persist("empty", Vec::new()).await.unwrap();
        let report = reconciler(&h, 0, false).run_batch().await.unwrap();
        assert_eq!(
            report.results[0].outcome,
            ReconcileOutcome::Skipped(SkipReason::NoNewMessages)
        );
        assert_eq!(h.analyzer.call_count().await, 0);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn dry_run_writes_nothing() {
        let h = TestHarness::new().await.unwrap();
        h.seed_conversation("c1", 5).await.unwrap();
        let report = reconciler(&h, 1, true).run_batch().await.unwrap();

        assert_eq!(
            report.results[0].outcome,
            ReconcileOutcome::Skipped(SkipReason::DryRun)
        );
        assert_eq!(h.analyzer.call_count().await, 0);
        assert_eq!(conversation(&h, "c1").await.last_analyzed_message_count, 0);
        assert!(audit::get_audit_fact(&h.db, "c1").await.unwrap().is_none());
        assert!(logs_contain("dry run"));
    }

    #[tokio::test]
    async fn failure_is_isolated_to_one_conversation() {
        let analyzer = MockAnalyzer::with_responses(vec![
            Ok(verdict("A")),
            Err("analyzer returned 500".into()),
            Ok(verdict("C")),
        ]);
        let h = TestHarness::with_analyzer(analyzer).await.unwrap();
        for id in ["a", "b", "c"] {
            h.seed_conversation(id, 3).await.unwrap();
        }

        let report = reconciler(&h, 1, false).run_batch().await.unwrap();
        assert_eq!(report.processed(), 3);
        assert_eq!(report.updated(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(report.results[1].outcome, ReconcileOutcome::Failed(_)));

        let b = conversation(&h, "b").await;
        assert_eq!(b.last_analyzed_message_count, 0);
        assert_eq!(b.last_analyzed_message_id, None);
        assert!(audit::get_audit_fact(&h.db, "b").await.unwrap().is_none());
        assert_eq!(conversation(&h, "c").await.context_summary, "C");
    }

    #[tokio::test]
    async fn elevated_risk_records_incident_and_auto_replies() {
        let h = TestHarness::new().await.unwrap();
        h.seed_conversation("c1", 4).await.unwrap();
        let mut v = verdict("angry customer");
        v.risk_level = "High".into();
        // m001 is a shop message in the delta; the other id is foreign.
        v.auto_reply_message_ids = vec!["c1-m001".into(), "other-m001".into()];
        h.analyzer.push_verdict(v).await;

        reconciler(&h, 1, false).run_batch().await.unwrap();

        let incidents = audit::list_risk_incidents(&h.db, "c1").await.unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].incident_id, "risk_c1_c1-m003");
        assert_eq!(incidents[0].review_status, "Pending");

        let stored = messages::get_messages_for_conversation(&h.db, "c1")
            .await
            .unwrap();
        let flagged: Vec<_> = stored.iter().filter(|m| m.is_auto_reply).map(|m| m.id.as_str()).collect();
        assert_eq!(flagged, vec!["c1-m001"]);
    }

    #[tokio::test]
    async fn low_risk_records_no_incident() {
        let h = TestHarness::new().await.unwrap();
        h.seed_conversation("c1", 2).await.unwrap();
        reconciler(&h, 1, false).run_batch().await.unwrap();
        assert!(audit::list_risk_incidents(&h.db, "c1").await.unwrap().is_empty());
    }
}
