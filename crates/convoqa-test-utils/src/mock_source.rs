// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record source for ingestion tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use convoqa_core::traits::adapter::PluginAdapter;
use convoqa_core::traits::source::RecordSource;
use convoqa_core::types::{
    AdapterType, HealthStatus, RawConversation, RawCustomer, RawMessage, RawSender,
};
use convoqa_core::ConvoqaError;

#[derive(Default)]
pub struct MockSource {
    conversations: Mutex<Vec<RawConversation>>,
    messages: Mutex<HashMap<String, Vec<RawMessage>>>,
    failing: Mutex<HashSet<String>>,
    list_failure: Mutex<Option<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_conversation(&self, conversation: RawConversation, messages: Vec<RawMessage>) {
        self.messages
            .lock()
            .await
            .insert(conversation.id.clone(), messages);
        self.conversations.lock().await.push(conversation);
    }

    /// Make `fetch_messages` fail for this conversation.
    pub async fn fail_messages_for(&self, conversation_id: &str) {
        self.failing.lock().await.insert(conversation_id.to_string());
    }

    /// Make `list_conversations` fail.
    pub async fn fail_listing(&self, message: &str) {
        *self.list_failure.lock().await = Some(message.to_string());
    }

    /// A conversation with one customer and no tags.
    pub fn raw_conversation(id: &str, page_id: &str, customer: &str) -> RawConversation {
        RawConversation {
            id: id.to_string(),
            page_id: Some(page_id.to_string()),
            snippet: None,
            inserted_at: None,
            updated_at: Some("2026-01-05T06:00:00Z".to_string()),
            customers: vec![RawCustomer {
                id: format!("cust-{id}"),
                name: customer.to_string(),
            }],
            tags: Vec::new(),
        }
    }

    /// A message sent by the customer (`from_shop == false`) or by the page.
    pub fn raw_message(id: &str, page_id: &str, at: &str, from_shop: bool) -> RawMessage {
        RawMessage {
            id: id.to_string(),
            message: format!("text {id}"),
            from: RawSender {
                id: Some(if from_shop { page_id.to_string() } else { "cust".to_string() }),
                name: if from_shop { "Shop" } else { "Customer" }.to_string(),
                admin_id: None,
            },
            inserted_at: at.to_string(),
        }
    }
}

#[async_trait]
impl PluginAdapter for MockSource {
    fn name(&self) -> &str {
        "mock-source"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, ConvoqaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConvoqaError> {
        Ok(())
    }
}

#[async_trait]
impl RecordSource for MockSource {
    async fn list_conversations(&self) -> Result<Vec<RawConversation>, ConvoqaError> {
        if let Some(message) = self.list_failure.lock().await.clone() {
            return Err(ConvoqaError::ingestion(message));
        }
        Ok(self.conversations.lock().await.clone())
    }

    async fn fetch_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<RawMessage>, ConvoqaError> {
        if self.failing.lock().await.contains(conversation_id) {
            return Err(ConvoqaError::ingestion(format!(
                "messages unavailable for {conversation_id}"
            )));
        }
        Ok(self
            .messages
            .lock()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}
