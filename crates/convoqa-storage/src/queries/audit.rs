// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit facts, risk incidents, and the atomic reconciliation commit.

use convoqa_core::ConvoqaError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{AnalysisCommit, AuditFact, EvidenceQuote, RiskIncident};

fn to_json(evidence: &[EvidenceQuote]) -> Result<String, rusqlite::Error> {
    serde_json::to_string(evidence).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn from_json(idx: usize, text: String) -> Result<Vec<EvidenceQuote>, rusqlite::Error> {
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn upsert_fact_stmt(conn: &rusqlite::Connection, fact: &AuditFact) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO fact_conversation_audit
            (conversation_id, sentiment_label, risk_level, rep_quality, user_intent,
             audit_evidence, analyzed_through_message_id, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(conversation_id) DO UPDATE SET
            sentiment_label = excluded.sentiment_label,
            risk_level = excluded.risk_level,
            rep_quality = excluded.rep_quality,
            user_intent = excluded.user_intent,
            audit_evidence = excluded.audit_evidence,
            analyzed_through_message_id = excluded.analyzed_through_message_id,
            updated_at = excluded.updated_at",
        params![
            fact.conversation_id,
            fact.sentiment_label,
            fact.risk_level,
            fact.rep_quality,
            fact.user_intent,
            to_json(&fact.audit_evidence)?,
            fact.analyzed_through_message_id,
            fact.updated_at,
        ],
    )?;
    Ok(())
}

/// Insert or overwrite the audit fact for a conversation.
pub async fn upsert_audit_fact(db: &Database, fact: &AuditFact) -> Result<(), ConvoqaError> {
    let fact = fact.clone();
    db.connection()
        .call(move |conn| upsert_fact_stmt(conn, &fact))
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_audit_fact(
    db: &Database,
    conversation_id: &str,
) -> Result<Option<AuditFact>, ConvoqaError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT conversation_id, sentiment_label, risk_level, rep_quality, user_intent,
                        audit_evidence, analyzed_through_message_id, updated_at
                 FROM fact_conversation_audit WHERE conversation_id = ?1",
                params![conversation_id],
                |row| {
                    Ok(AuditFact {
                        conversation_id: row.get(0)?,
                        sentiment_label: row.get(1)?,
                        risk_level: row.get(2)?,
                        rep_quality: row.get(3)?,
                        user_intent: row.get(4)?,
                        audit_evidence: from_json(5, row.get(5)?)?,
                        analyzed_through_message_id: row.get(6)?,
                        updated_at: row.get(7)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn list_risk_incidents(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<RiskIncident>, ConvoqaError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT incident_id, conversation_id, risk_level, evidence, review_status, created_at
                 FROM fact_risk_incidents WHERE conversation_id = ?1
                 ORDER BY created_at, incident_id",
            )?;
            let rows = stmt.query_map(params![conversation_id], |row| {
                Ok(RiskIncident {
                    incident_id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    risk_level: row.get(2)?,
                    evidence: from_json(3, row.get(3)?)?,
                    review_status: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply one successful reconciliation.
///
/// The fact upsert, watermark advance, auto-reply flags and risk incident
/// are written in a single transaction: either all land or none do.
/// Returns `NotFound` if the conversation row is gone.
pub async fn commit_analysis(db: &Database, commit: AnalysisCommit) -> Result<(), ConvoqaError> {
    let conversation_id = commit.fact.conversation_id.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let fact = &commit.fact;

            let changed = tx.execute(
                "UPDATE conversations SET
                    last_analyzed_at = ?2,
                    last_analyzed_message_count = MAX(last_analyzed_message_count, MIN(?3, message_count_total)),
                    last_analyzed_message_id = ?4,
                    context_summary = ?5
                 WHERE id = ?1",
                params![
                    fact.conversation_id,
                    fact.updated_at,
                    commit.analyzed_message_count,
                    commit.last_message_id,
                    commit.new_summary,
                ],
            )?;
            if changed == 0 {
                // Dropping the transaction rolls it back.
                return Ok(false);
            }

            upsert_fact_stmt(&tx, fact)?;

            {
                let mut stmt = tx.prepare(
                    "UPDATE messages SET is_auto_reply = 1
                     WHERE id = ?1 AND conversation_id = ?2 AND is_from_shop = 1",
                )?;
                for id in &commit.auto_reply_message_ids {
                    stmt.execute(params![id, fact.conversation_id])?;
                }
            }

            if let Some(incident) = &commit.risk_incident {
                tx.execute(
                    "INSERT OR IGNORE INTO fact_risk_incidents
                        (incident_id, conversation_id, risk_level, evidence, review_status, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        incident.incident_id,
                        incident.conversation_id,
                        incident.risk_level,
                        to_json(&incident.evidence)?,
                        incident.review_status,
                        incident.created_at,
                    ],
                )?;
            }

            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated {
        Ok(())
    } else {
        Err(ConvoqaError::NotFound {
            entity: "conversation".into(),
            id: conversation_id,
        })
    }
}
