// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket fact access and per-day ticket counts.

use convoqa_core::ConvoqaError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, now_timestamp};
use crate::models::{Ticket, TicketCounts, TicketMetrics, TicketStatus};

fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    let status: String = row.get(3)?;
    let status = status.parse::<TicketStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Ticket {
        ticket_id: row.get(0)?,
        conversation_id: row.get(1)?,
        staff_key: row.get(2)?,
        status,
        start_message_id: row.get(4)?,
        end_message_id: row.get(5)?,
        created_at: row.get(6)?,
        closed_at: row.get(7)?,
        created_date_key: row.get(8)?,
        closed_date_key: row.get(9)?,
        metrics: TicketMetrics {
            first_response_minutes: row.get(10)?,
            resolution_minutes: row.get(11)?,
            is_first_contact_resolution: row.get(12)?,
            auto_reply_count: row.get(13)?,
            human_response_count: row.get(14)?,
        },
    })
}

/// Insert a ticket produced by segmentation, or replace its span and status.
pub async fn upsert_ticket(db: &Database, ticket: &Ticket) -> Result<(), ConvoqaError> {
    let t = ticket.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO fact_tickets
                    (ticket_id, conversation_id, staff_key, status, start_message_id, end_message_id,
                     created_at, closed_at, created_date_key, closed_date_key,
                     first_response_minutes, resolution_minutes, is_first_contact_resolution,
                     auto_reply_count, human_response_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT(ticket_id) DO UPDATE SET
                    staff_key = excluded.staff_key,
                    status = excluded.status,
                    start_message_id = excluded.start_message_id,
                    end_message_id = excluded.end_message_id,
                    created_at = excluded.created_at,
                    closed_at = excluded.closed_at,
                    created_date_key = excluded.created_date_key,
                    closed_date_key = excluded.closed_date_key",
                params![
                    t.ticket_id,
                    t.conversation_id,
                    t.staff_key,
                    t.status.to_string(),
                    t.start_message_id,
                    t.end_message_id,
                    t.created_at,
                    t.closed_at,
                    t.created_date_key,
                    t.closed_date_key,
                    t.metrics.first_response_minutes,
                    t.metrics.resolution_minutes,
                    t.metrics.is_first_contact_resolution,
                    t.metrics.auto_reply_count,
                    t.metrics.human_response_count,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_ticket(db: &Database, ticket_id: &str) -> Result<Option<Ticket>, ConvoqaError> {
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT ticket_id, conversation_id, staff_key, status, start_message_id,
                        end_message_id, created_at, closed_at, created_date_key, closed_date_key,
                        first_response_minutes, resolution_minutes, is_first_contact_resolution,
                        auto_reply_count, human_response_count
                 FROM fact_tickets WHERE ticket_id = ?1",
                params![ticket_id],
                row_to_ticket,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All ticket ids, ordered.
pub async fn list_ticket_ids(db: &Database) -> Result<Vec<String>, ConvoqaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT ticket_id FROM fact_tickets ORDER BY ticket_id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store recomputed measures and date keys. Returns `false` if the ticket is gone.
pub async fn update_ticket_metrics(
    db: &Database,
    ticket_id: &str,
    metrics: &TicketMetrics,
    created_date_key: Option<i64>,
    closed_date_key: Option<i64>,
) -> Result<bool, ConvoqaError> {
    let ticket_id = ticket_id.to_string();
    let m = metrics.clone();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE fact_tickets SET
                    first_response_minutes = ?2,
                    resolution_minutes = ?3,
                    is_first_contact_resolution = ?4,
                    auto_reply_count = ?5,
                    human_response_count = ?6,
                    created_date_key = ?7,
                    closed_date_key = ?8,
                    last_updated = ?9
                 WHERE ticket_id = ?1",
                params![
                    ticket_id,
                    m.first_response_minutes,
                    m.resolution_minutes,
                    m.is_first_contact_resolution,
                    m.auto_reply_count,
                    m.human_response_count,
                    created_date_key,
                    closed_date_key,
                    now,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Ticket counts for `date_key`, optionally restricted to one staff member.
///
/// Open: created on or before the date and either still open or closed
/// after the end of it. New: created on the date. Closed: closed on the date.
pub async fn count_tickets_for_date(
    db: &Database,
    date_key: i64,
    staff_key: Option<&str>,
) -> Result<TicketCounts, ConvoqaError> {
    let staff_key = staff_key.map(str::to_string);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT
                    COALESCE(SUM(CASE WHEN created_date_key <= ?1
                                       AND (status = 'OPEN' OR closed_date_key > ?1)
                                      THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN created_date_key = ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN closed_date_key = ?1 THEN 1 ELSE 0 END), 0)
                 FROM fact_tickets
                 WHERE (?2 IS NULL OR staff_key = ?2)",
                params![date_key, staff_key],
                |row| {
                    Ok(TicketCounts {
                        open: row.get(0)?,
                        new: row.get(1)?,
                        closed: row.get(2)?,
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
