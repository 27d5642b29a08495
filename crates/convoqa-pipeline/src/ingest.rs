// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion persistence.
//!
//! Pulls raw conversations and messages from a [`RecordSource`] and writes
//! them into the warehouse, one conversation at a time with a fixed pause
//! between upstream reads. Watermark fields are never touched here.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use convoqa_core::traits::{PluginAdapter, RecordSource};
use convoqa_core::types::{
    AdapterType, HealthStatus, Message, RawConversation, RawMessage, Tag,
};
use convoqa_core::ConvoqaError;
use convoqa_storage::models::ConversationHeader;
use convoqa_storage::queries::{conversations, dimensions};
use convoqa_storage::Database;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Totals from one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub conversations: usize,
    pub messages: usize,
    pub failed: usize,
    pub tags: usize,
}

pub struct Ingestor {
    db: Database,
    source: Arc<dyn RecordSource + Send + Sync>,
    page_id: Option<String>,
    delay: Duration,
}

impl Ingestor {
    pub fn new(
        db: Database,
        source: Arc<dyn RecordSource + Send + Sync>,
        page_id: Option<String>,
        delay: Duration,
    ) -> Self {
        Self {
            db,
            source,
            page_id,
            delay,
        }
    }

    /// Sync everything the source currently exposes.
    ///
    /// A listing failure aborts the run. A message-fetch failure only skips
    /// that conversation.
    pub async fn run(&self) -> Result<IngestReport, ConvoqaError> {
        let raw_conversations = self.source.list_conversations().await?;
        info!(
            source = self.source.name(),
            conversations = raw_conversations.len(),
            "ingestion started"
        );

        let mut report = IngestReport::default();
        let tags = collect_tags(&raw_conversations);
        report.tags = tags.len();
        if !tags.is_empty() {
            dimensions::upsert_tags(&self.db, tags).await?;
        }

        for (i, raw) in raw_conversations.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let raw_messages = match self.source.fetch_messages(&raw.id).await {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(conversation_id = %raw.id, error = %e, "message fetch failed, skipping");
                    report.failed += 1;
                    continue;
                }
            };

            let page_id = raw.page_id.as_deref().or(self.page_id.as_deref());
            let messages: Vec<Message> = raw_messages
                .iter()
                .map(|m| to_message(&raw.id, m, page_id))
                .collect();
            let fetched = messages.len();

            let total =
                conversations::persist_conversation_records(&self.db, &to_header(raw), messages)
                    .await?;
            debug!(conversation_id = %raw.id, fetched, total, "conversation persisted");
            report.conversations += 1;
            report.messages += fetched;
        }

        info!(
            conversations = report.conversations,
            messages = report.messages,
            failed = report.failed,
            "ingestion finished"
        );
        Ok(report)
    }
}

fn collect_tags(raw: &[RawConversation]) -> Vec<Tag> {
    let mut by_id = BTreeMap::new();
    for conversation in raw {
        for tag in &conversation.tags {
            let id = tag.id_string();
            by_id.entry(id.clone()).or_insert_with(|| Tag {
                id,
                name: tag.text.clone(),
                color: tag.color.clone(),
                page_id: conversation.page_id.clone(),
            });
        }
    }
    by_id.into_values().collect()
}

fn to_header(raw: &RawConversation) -> ConversationHeader {
    ConversationHeader {
        id: raw.id.clone(),
        page_id: raw.page_id.clone(),
        customer_name: raw.customers.first().map(|c| c.name.clone()),
        snippet: raw.snippet.clone(),
        updated_at: raw.updated_at.clone(),
        full_json: serde_json::to_string(raw).ok(),
    }
}

fn to_message(conversation_id: &str, raw: &RawMessage, page_id: Option<&str>) -> Message {
    Message {
        id: raw.id.clone(),
        conversation_id: conversation_id.to_string(),
        sender_id: raw.from.id.clone(),
        sender_name: raw.from.name.clone(),
        content: raw.message.clone(),
        inserted_at: raw.inserted_at.clone(),
        is_from_shop: raw.from.is_from_shop(page_id),
        is_auto_reply: false,
        full_json: serde_json::to_string(raw).ok(),
    }
}

/// One conversation in a JSON dump, with its messages inline.
#[derive(Debug, Clone, Deserialize)]
struct DumpedConversation {
    #[serde(flatten)]
    conversation: RawConversation,
    #[serde(default)]
    messages: Vec<RawMessage>,
}

/// A [`RecordSource`] reading a JSON array of conversations, each carrying
/// a `messages` array.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Vec<DumpedConversation>, ConvoqaError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| ConvoqaError::Ingestion {
            message: format!("failed to read {}", self.path.display()),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ConvoqaError::Ingestion {
            message: format!("invalid record dump {}", self.path.display()),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl PluginAdapter for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, ConvoqaError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a file",
                self.path.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), ConvoqaError> {
        Ok(())
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn list_conversations(&self) -> Result<Vec<RawConversation>, ConvoqaError> {
        Ok(self.load().await?.into_iter().map(|d| d.conversation).collect())
    }

    async fn fetch_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<RawMessage>, ConvoqaError> {
        self.load()
            .await?
            .into_iter()
            .find(|d| d.conversation.id == conversation_id)
            .map(|d| d.messages)
            .ok_or_else(|| ConvoqaError::NotFound {
                entity: "conversation".into(),
                id: conversation_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoqa_core::types::RawTag;
    use convoqa_storage::queries::messages;
    use convoqa_test_utils::{MockSource, TestHarness};

    fn ingestor(h: &TestHarness, source: Arc<MockSource>) -> Ingestor {
        Ingestor::new(h.db.clone(), source, Some("page-1".into()), Duration::ZERO)
    }

    fn msgs(conv: &str, n: usize) -> Vec<RawMessage> {
        (0..n)
            .map(|i| {
                MockSource::raw_message(
                    &format!("{conv}-{i}"),
                    "page-1",
                    &format!("2026-01-05T06:0{i}:00Z"),
                    i % 2 == 1,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn persists_conversations_and_counts() {
        let h = TestHarness::new().await.unwrap();
        let source = Arc::new(MockSource::new());
        source
            .add_conversation(MockSource::raw_conversation("c1", "page-1", "Lan"), msgs("c1", 3))
            .await;

        let report = ingestor(&h, source).run().await.unwrap();
        assert_eq!(report.conversations, 1);
        assert_eq!(report.messages, 3);

        let conv = conversations::get_conversation(&h.db, "c1").await.unwrap().unwrap();
        assert_eq!(conv.message_count_total, 3);
        assert_eq!(conv.customer_name.as_deref(), Some("Lan"));
        let stored = messages::get_messages_for_conversation(&h.db, "c1").await.unwrap();
        assert!(!stored[0].is_from_shop);
        assert!(stored[1].is_from_shop);

        let raw: RawMessage =
            serde_json::from_str(stored[0].full_json.as_deref().unwrap()).unwrap();
        assert_eq!(raw.id, "c1-0");
    }

    #[tokio::test]
    async fn reingestion_keeps_watermark() {
        let h = TestHarness::new().await.unwrap();
        let source = Arc::new(MockSource::new());
        source
            .add_conversation(MockSource::raw_conversation("c1", "page-1", "Lan"), msgs("c1", 4))
            .await;
        let ing = ingestor(&h, source);
        ing.run().await.unwrap();
        conversations::advance_analyzed_count(&h.db, "c1", 4).await.unwrap();

        ing.run().await.unwrap();
        let conv = conversations::get_conversation(&h.db, "c1").await.unwrap().unwrap();
        assert_eq!(conv.message_count_total, 4);
        assert_eq!(conv.last_analyzed_message_count, 4);
    }

    #[tokio::test]
    async fn fetch_failure_skips_one_conversation() {
        let h = TestHarness::new().await.unwrap();
        let source = Arc::new(MockSource::new());
        for id in ["a", "b"] {
            source
                .add_conversation(MockSource::raw_conversation(id, "page-1", "X"), msgs(id, 2))
                .await;
        }
        source.fail_messages_for("a").await;

        let report = ingestor(&h, source).run().await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.conversations, 1);
        assert!(conversations::get_conversation(&h.db, "a").await.unwrap().is_none());
        assert!(conversations::get_conversation(&h.db, "b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn listing_failure_aborts() {
        let h = TestHarness::new().await.unwrap();
        let source = Arc::new(MockSource::new());
        source.fail_listing("upstream 503").await;
        assert!(ingestor(&h, source).run().await.is_err());
    }

    #[tokio::test]
    async fn tags_are_deduplicated() {
        let h = TestHarness::new().await.unwrap();
        let source = Arc::new(MockSource::new());
        let tag = RawTag {
            id: serde_json::json!(7),
            text: "refund".into(),
            color: None,
        };
        for id in ["a", "b"] {
            let mut conv = MockSource::raw_conversation(id, "page-1", "X");
            conv.tags = vec![tag.clone()];
            source.add_conversation(conv, Vec::new()).await;
        }
        let report = ingestor(&h, source).run().await.unwrap();
        assert_eq!(report.tags, 1);
        let tags = dimensions::list_tags(&h.db).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, "7");
    }

    #[tokio::test]
    async fn json_file_source_reads_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        std::fs::write(
            &path,
            r#"[{
                "id": "c9",
                "page_id": "page-1",
                "customers": [{"id": "u1", "name": "Minh"}],
                "messages": [
                    {"id": "m1", "message": "hi", "from": {"id": "u1", "name": "Minh"}, "inserted_at": "2026-01-05T06:00:00Z"},
                    {"id": "m2", "message": "hello", "from": {"id": "x", "name": "Shop", "admin_id": "a1"}, "inserted_at": "2026-01-05T06:01:00Z"}
                ]
            }]"#,
        )
        .unwrap();

        let source = JsonFileSource::new(&path);
        assert_eq!(source.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(source.list_conversations().await.unwrap().len(), 1);
        let messages = source.fetch_messages("c9").await.unwrap();
        assert!(messages[1].from.is_from_shop(Some("page-1")));
        assert!(source.fetch_messages("missing").await.is_err());
    }
}
