// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record source trait for the ingestion collaborator.

use async_trait::async_trait;

use crate::error::ConvoqaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{RawConversation, RawMessage};

/// Upstream platform records, exposed as finite ordered sequences.
///
/// The ingestor calls these one at a time, so an implementation never sees
/// more than one in-flight request.
#[async_trait]
pub trait RecordSource: PluginAdapter {
    /// All conversations currently visible upstream.
    async fn list_conversations(&self) -> Result<Vec<RawConversation>, ConvoqaError>;

    /// Messages of one conversation, in any order.
    async fn fetch_messages(&self, conversation_id: &str)
    -> Result<Vec<RawMessage>, ConvoqaError>;
}
