// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message reads.

use convoqa_core::ConvoqaError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Message;

/// All messages of a conversation in chronological order. Equal timestamps
/// keep their insertion order.
pub async fn get_messages_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<Message>, ConvoqaError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, sender_name, content, inserted_at,
                        is_from_shop, is_auto_reply, full_json
                 FROM messages WHERE conversation_id = ?1
                 ORDER BY inserted_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    sender_id: row.get(2)?,
                    sender_name: row.get(3)?,
                    content: row.get(4)?,
                    inserted_at: row.get(5)?,
                    is_from_shop: row.get(6)?,
                    is_auto_reply: row.get(7)?,
                    full_json: row.get(8)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations::persist_conversation_records;
    use crate::testing::{header, message, open_temp};

    #[tokio::test]
    async fn messages_come_back_in_time_order_with_stable_ties() {
        let (db, _dir) = open_temp().await;
        let msgs = vec![
            message("c1", "late", "2026-01-01T10:05:00Z", false),
            message("c1", "tie-a", "2026-01-01T10:00:00Z", true),
            message("c1", "tie-b", "2026-01-01T10:00:00Z", false),
        ];
        persist_conversation_records(&db, &header("c1"), msgs).await.unwrap();

        let got = get_messages_for_conversation(&db, "c1").await.unwrap();
        let ids: Vec<_> = got.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["tie-a", "tie-b", "late"]);
        assert!(got[0].is_from_shop);
        assert!(!got[1].is_from_shop);
    }

    #[tokio::test]
    async fn unknown_conversation_has_no_messages() {
        let (db, _dir) = open_temp().await;
        assert!(get_messages_for_conversation(&db, "nope").await.unwrap().is_empty());
    }
}
