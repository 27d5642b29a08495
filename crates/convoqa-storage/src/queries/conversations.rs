// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation reads, candidate selection, and ingestion writes.
//!
//! The watermark columns are only ever written through
//! [`advance_analyzed_count`] and [`crate::queries::audit::commit_analysis`].

use convoqa_core::ConvoqaError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{Conversation, ConversationHeader, Message};

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        page_id: row.get(1)?,
        customer_name: row.get(2)?,
        snippet: row.get(3)?,
        updated_at: row.get(4)?,
        message_count_total: row.get(5)?,
        last_analyzed_message_count: row.get(6)?,
        last_analyzed_message_id: row.get(7)?,
        last_analyzed_at: row.get(8)?,
        context_summary: row.get(9)?,
    })
}

/// Get a conversation by id.
pub async fn get_conversation(db: &Database, id: &str) -> Result<Option<Conversation>, ConvoqaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, page_id, customer_name, snippet, updated_at, message_count_total,
                        last_analyzed_message_count, last_analyzed_message_id, last_analyzed_at,
                        context_summary
                 FROM conversations WHERE id = ?1",
                params![id],
                row_to_conversation,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Conversations whose unanalyzed backlog is at least `threshold`, ordered by id.
///
/// Scans the whole table on every call.
pub async fn select_candidates(
    db: &Database,
    threshold: u32,
) -> Result<Vec<Conversation>, ConvoqaError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, page_id, customer_name, snippet, updated_at, message_count_total,
                        last_analyzed_message_count, last_analyzed_message_id, last_analyzed_at,
                        context_summary
                 FROM conversations
                 WHERE message_count_total - last_analyzed_message_count >= ?1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![threshold], row_to_conversation)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move `last_analyzed_message_count` forward to `count` without touching any
/// other watermark field. Clamped to `message_count_total`.
///
/// Returns `false` if the conversation does not exist.
pub async fn advance_analyzed_count(
    db: &Database,
    id: &str,
    count: i64,
) -> Result<bool, ConvoqaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE conversations
                 SET last_analyzed_message_count = MAX(last_analyzed_message_count, MIN(?2, message_count_total))
                 WHERE id = ?1",
                params![id, count],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist one upstream conversation and its messages atomically.
///
/// The header is upserted, messages are inserted with their upstream ids
/// (existing ids are left alone), and `message_count_total` is set to the
/// number of messages now stored locally. Returns that count.
pub async fn persist_conversation_records(
    db: &Database,
    header: &ConversationHeader,
    messages: Vec<Message>,
) -> Result<i64, ConvoqaError> {
    let header = header.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO conversations (id, page_id, customer_name, snippet, updated_at, full_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    page_id = COALESCE(excluded.page_id, conversations.page_id),
                    customer_name = COALESCE(excluded.customer_name, conversations.customer_name),
                    snippet = COALESCE(excluded.snippet, conversations.snippet),
                    updated_at = COALESCE(excluded.updated_at, conversations.updated_at),
                    full_json = COALESCE(excluded.full_json, conversations.full_json)",
                params![
                    header.id,
                    header.page_id,
                    header.customer_name,
                    header.snippet,
                    header.updated_at,
                    header.full_json,
                ],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO messages (id, conversation_id, sender_id, sender_name, content,
                                           inserted_at, is_from_shop, is_auto_reply, full_json)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT(id) DO NOTHING",
                )?;
                for msg in &messages {
                    stmt.execute(params![
                        msg.id,
                        header.id,
                        msg.sender_id,
                        msg.sender_name,
                        msg.content,
                        msg.inserted_at,
                        msg.is_from_shop,
                        msg.is_auto_reply,
                        msg.full_json,
                    ])?;
                }
            }
            let total: i64 = tx.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                params![header.id],
                |row| row.get(0),
            )?;
            tx.execute(
                "UPDATE conversations SET message_count_total = ?2 WHERE id = ?1",
                params![header.id, total],
            )?;
            tx.commit()?;
            Ok(total)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
