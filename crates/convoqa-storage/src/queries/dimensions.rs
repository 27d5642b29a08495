// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag, staff and date dimension access.

use convoqa_core::ConvoqaError;
use rusqlite::params;

use crate::database::{Database, now_timestamp};
use crate::models::{DateDimension, Staff, Tag};

/// Snapshot of the tag dimension, ordered by id.
pub async fn list_tags(db: &Database) -> Result<Vec<Tag>, ConvoqaError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, color, page_id FROM dim_platform_tags ORDER BY id")?;
            let rows = stmt.query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    page_id: row.get(3)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or refresh tags, stamping `last_synced_at`.
pub async fn upsert_tags(db: &Database, tags: Vec<Tag>) -> Result<(), ConvoqaError> {
    if tags.is_empty() {
        return Ok(());
    }
    let synced_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO dim_platform_tags (id, name, color, page_id, last_synced_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        color = excluded.color,
                        page_id = excluded.page_id,
                        last_synced_at = excluded.last_synced_at",
                )?;
                for tag in &tags {
                    stmt.execute(params![tag.id, tag.name, tag.color, tag.page_id, synced_at])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn upsert_staff(db: &Database, staff: &Staff) -> Result<(), ConvoqaError> {
    let staff = staff.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dim_staff (staff_key, staff_name, is_active) VALUES (?1, ?2, ?3)
                 ON CONFLICT(staff_key) DO UPDATE SET
                    staff_name = excluded.staff_name,
                    is_active = excluded.is_active",
                params![staff.staff_key, staff.staff_name, staff.is_active],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active staff members ordered by key.
pub async fn list_active_staff(db: &Database) -> Result<Vec<Staff>, ConvoqaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT staff_key, staff_name, is_active FROM dim_staff
                 WHERE is_active = 1 ORDER BY staff_key",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Staff {
                    staff_key: row.get(0)?,
                    staff_name: row.get(1)?,
                    is_active: row.get(2)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert the date row if it is not there yet. Existing rows are never rewritten.
pub async fn ensure_date(db: &Database, date: &DateDimension) -> Result<(), ConvoqaError> {
    let d = date.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO dim_date
                    (date_key, full_date, year, quarter, month, week, day, day_of_week, is_weekend)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    d.date_key,
                    d.full_date,
                    d.year,
                    d.quarter,
                    d.month,
                    d.week,
                    d.day,
                    d.day_of_week,
                    d.is_weekend,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::open_temp;

    #[tokio::test]
    async fn tags_upsert_and_list() {
        let (db, _dir) = open_temp().await;
        let tag = |id: &str, name: &str| Tag {
            id: id.into(),
            name: name.into(),
            color: None,
            page_id: Some("p".into()),
        };
        upsert_tags(&db, vec![tag("2", "Refund"), tag("1", "Booking")]).await.unwrap();
        upsert_tags(&db, vec![tag("2", "Refund request")]).await.unwrap();

        let tags = list_tags(&db).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "Booking");
        assert_eq!(tags[1].name, "Refund request");
    }

    #[tokio::test]
    async fn inactive_staff_are_not_listed() {
        let (db, _dir) = open_temp().await;
        for (name, active) in [("Anna", true), ("Bao", false)] {
            upsert_staff(
                &db,
                &Staff {
                    staff_key: Staff::key_for(name),
                    staff_name: name.into(),
                    is_active: active,
                },
            )
            .await
            .unwrap();
        }
        let staff = list_active_staff(&db).await.unwrap();
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].staff_key, "staff_anna");
    }

    #[tokio::test]
    async fn ensure_date_is_idempotent() {
        let (db, _dir) = open_temp().await;
        let date = DateDimension {
            date_key: 20260105,
            full_date: "2026-01-05".into(),
            year: 2026,
            quarter: 1,
            month: 1,
            week: 2,
            day: 5,
            day_of_week: 1,
            is_weekend: false,
        };
        ensure_date(&db, &date).await.unwrap();
        ensure_date(&db, &date).await.unwrap();
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM dim_date", [], |r| r.get(0))
            })
            .await
            .map_err(crate::database::map_tr_err)
            .unwrap();
        assert_eq!(count, 1);
    }
}
