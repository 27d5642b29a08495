// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database harness with seeding helpers.
//!
//! `TestHarness` owns a migrated SQLite warehouse in a temp directory plus a
//! shared [`MockAnalyzer`]. Seeding goes through the same storage queries the
//! ingestor uses, so watermark invariants hold for seeded data.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use convoqa_core::ConvoqaError;
use convoqa_storage::models::{ConversationHeader, Message, Staff, Tag, Ticket};
use convoqa_storage::queries::{conversations, dimensions, tickets};
use convoqa_storage::Database;

use crate::mock_analyzer::MockAnalyzer;

pub struct TestHarness {
    pub db: Database,
    pub analyzer: Arc<MockAnalyzer>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub async fn new() -> Result<Self, ConvoqaError> {
        Self::with_analyzer(MockAnalyzer::new()).await
    }

    pub async fn with_analyzer(analyzer: MockAnalyzer) -> Result<Self, ConvoqaError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ConvoqaError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;
        Ok(Self {
            db,
            analyzer: Arc::new(analyzer),
            _temp_dir: temp_dir,
        })
    }

    /// Seed a conversation with `count` messages one minute apart, starting
    /// 2026-01-05T06:00:00Z. Even positions are customer messages, odd ones
    /// come from the shop. Message ids are `{id}-m{index:03}`.
    pub async fn seed_conversation(
        &self,
        id: &str,
        count: usize,
    ) -> Result<Vec<Message>, ConvoqaError> {
        let messages = Self::messages(id, count);
        self.persist(id, messages.clone()).await?;
        Ok(messages)
    }

    /// Persist explicit messages for a conversation.
    pub async fn persist(&self, id: &str, messages: Vec<Message>) -> Result<i64, ConvoqaError> {
        let header = ConversationHeader {
            id: id.to_string(),
            page_id: Some("page-1".to_string()),
            customer_name: Some(format!("Customer {id}")),
            snippet: None,
            updated_at: None,
            full_json: None,
        };
        conversations::persist_conversation_records(&self.db, &header, messages).await
    }

    pub fn messages(conversation_id: &str, count: usize) -> Vec<Message> {
        let base = Utc.with_ymd_and_hms(2026, 1, 5, 6, 0, 0).single();
        (0..count)
            .map(|i| {
                let at = base
                    .map(|b| (b + Duration::minutes(i as i64)).to_rfc3339())
                    .unwrap_or_default();
                Self::message(conversation_id, &format!("{conversation_id}-m{i:03}"), &at, i % 2 == 1)
            })
            .collect()
    }

    pub fn message(conversation_id: &str, id: &str, at: &str, from_shop: bool) -> Message {
        Message {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: Some(if from_shop { "page-1" } else { "cust" }.to_string()),
            sender_name: if from_shop { "Shop" } else { "Customer" }.to_string(),
            content: format!("content of {id}"),
            inserted_at: at.to_string(),
            is_from_shop: from_shop,
            is_auto_reply: false,
            full_json: None,
        }
    }

    pub async fn seed_ticket(&self, ticket: &Ticket) -> Result<(), ConvoqaError> {
        tickets::upsert_ticket(&self.db, ticket).await
    }

    pub async fn seed_staff(&self, name: &str) -> Result<Staff, ConvoqaError> {
        let staff = Staff {
            staff_key: Staff::key_for(name),
            staff_name: name.to_string(),
            is_active: true,
        };
        dimensions::upsert_staff(&self.db, &staff).await?;
        Ok(staff)
    }

    pub async fn seed_tags(&self, names: &[&str]) -> Result<Vec<Tag>, ConvoqaError> {
        let tags: Vec<Tag> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Tag {
                id: format!("tag-{i}"),
                name: (*name).to_string(),
                color: None,
                page_id: Some("page-1".to_string()),
            })
            .collect();
        dimensions::upsert_tags(&self.db, tags.clone()).await?;
        Ok(tags)
    }
}
