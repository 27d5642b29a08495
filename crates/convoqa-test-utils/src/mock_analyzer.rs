// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock analyzer adapter for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use convoqa_core::traits::adapter::PluginAdapter;
use convoqa_core::traits::analyzer::AnalyzerAdapter;
use convoqa_core::types::{AdapterType, AnalysisRequest, EvidenceQuote, HealthStatus, Verdict};
use convoqa_core::ConvoqaError;

/// A low-risk verdict carrying `summary` as its new summary.
pub fn verdict(summary: &str) -> Verdict {
    Verdict {
        sentiment_label: "Positive".to_string(),
        risk_level: "low".to_string(),
        rep_quality: "good".to_string(),
        user_intent: "inquiry".to_string(),
        audit_evidence: vec![EvidenceQuote {
            category: "tone".to_string(),
            quote: "thanks so much".to_string(),
        }],
        new_summary: summary.to_string(),
        auto_reply_message_ids: Vec::new(),
    }
}

/// An analyzer that answers from a FIFO queue.
///
/// `Err` entries are returned as analyzer errors. When the queue is empty
/// the default `verdict("mock summary")` is returned. Every request is
/// recorded for later inspection.
pub struct MockAnalyzer {
    responses: Arc<Mutex<VecDeque<Result<Verdict, String>>>>,
    requests: Arc<Mutex<Vec<AnalysisRequest>>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_responses(responses: Vec<Result<Verdict, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn push_verdict(&self, verdict: Verdict) {
        self.responses.lock().await.push_back(Ok(verdict));
    }

    pub async fn push_failure(&self, message: &str) {
        self.responses.lock().await.push_back(Err(message.to_string()));
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockAnalyzer {
    fn name(&self) -> &str {
        "mock-analyzer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Analyzer
    }

    async fn health_check(&self) -> Result<HealthStatus, ConvoqaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConvoqaError> {
        Ok(())
    }
}

#[async_trait]
impl AnalyzerAdapter for MockAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Verdict, ConvoqaError> {
        self.requests.lock().await.push(request.clone());
        match self.responses.lock().await.pop_front() {
            Some(Ok(verdict)) => Ok(verdict),
            Some(Err(message)) => Err(ConvoqaError::analyzer(message)),
            None => Ok(verdict("mock summary")),
        }
    }
}
