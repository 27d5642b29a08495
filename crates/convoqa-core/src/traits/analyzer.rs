// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analyzer adapter trait for the external LLM-backed audit service.

use async_trait::async_trait;

use crate::error::ConvoqaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AnalysisRequest, Verdict};

/// Sends a transcript delta out for analysis and returns a structured verdict.
///
/// Any outcome other than a parsed verdict is an `Err`; callers do not
/// distinguish transport failures from bad statuses or malformed payloads.
#[async_trait]
pub trait AnalyzerAdapter: PluginAdapter {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Verdict, ConvoqaError>;
}
