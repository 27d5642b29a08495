// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily snapshot upsert and lookup.

use convoqa_core::ConvoqaError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::DailySnapshot;

/// Insert or update a snapshot row.
///
/// The row is only rewritten when a count changed, so recomputing unchanged
/// inputs leaves it byte-identical, `calculated_at` included.
pub async fn upsert_daily_snapshot(
    db: &Database,
    snapshot: &DailySnapshot,
) -> Result<(), ConvoqaError> {
    let s = snapshot.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO fact_daily_snapshot
                    (snapshot_id, date_key, staff_key, open_tickets_count, new_tickets_count,
                     closed_tickets_count, calculated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(snapshot_id) DO UPDATE SET
                    open_tickets_count = excluded.open_tickets_count,
                    new_tickets_count = excluded.new_tickets_count,
                    closed_tickets_count = excluded.closed_tickets_count,
                    calculated_at = excluded.calculated_at
                 WHERE open_tickets_count != excluded.open_tickets_count
                    OR new_tickets_count != excluded.new_tickets_count
                    OR closed_tickets_count != excluded.closed_tickets_count",
                params![
                    s.snapshot_id,
                    s.date_key,
                    s.staff_key,
                    s.open_tickets_count,
                    s.new_tickets_count,
                    s.closed_tickets_count,
                    s.calculated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_daily_snapshot(
    db: &Database,
    snapshot_id: &str,
) -> Result<Option<DailySnapshot>, ConvoqaError> {
    let snapshot_id = snapshot_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT snapshot_id, date_key, staff_key, open_tickets_count, new_tickets_count,
                        closed_tickets_count, calculated_at
                 FROM fact_daily_snapshot WHERE snapshot_id = ?1",
                params![snapshot_id],
                |row| {
                    Ok(DailySnapshot {
                        snapshot_id: row.get(0)?,
                        date_key: row.get(1)?,
                        staff_key: row.get(2)?,
                        open_tickets_count: row.get(3)?,
                        new_tickets_count: row.get(4)?,
                        closed_tickets_count: row.get(5)?,
                        calculated_at: row.get(6)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
