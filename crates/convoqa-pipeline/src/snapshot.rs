// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-of-day ticket snapshots, overall and per staff member.

use chrono::{Datelike, NaiveDate, Weekday};
use convoqa_core::types::DailySnapshot;
use convoqa_core::ConvoqaError;
use convoqa_storage::database::now_timestamp;
use convoqa_storage::models::DateDimension;
use convoqa_storage::queries::{dimensions, snapshots, tickets};
use convoqa_storage::Database;
use tracing::{debug, info};

use crate::calendar::date_key;

/// Calendar attributes for the `dim_date` row of `date`.
pub fn date_dimension(date: NaiveDate) -> DateDimension {
    DateDimension {
        date_key: date_key(date),
        full_date: date.format("%Y-%m-%d").to_string(),
        year: date.year(),
        quarter: (date.month() - 1) / 3 + 1,
        month: date.month(),
        week: date.iso_week().week(),
        day: date.day(),
        day_of_week: date.weekday().num_days_from_sunday(),
        is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
    }
}

/// `YYYYMMDD` for the aggregate row, `YYYYMMDD_<staff>` for one staff member.
pub fn snapshot_id(date_key: i64, staff_key: Option<&str>) -> String {
    match staff_key {
        Some(staff) => format!("{date_key}_{staff}"),
        None => date_key.to_string(),
    }
}

/// Count open/new/closed tickets as of the end of `date` and upsert the row.
///
/// Rerunning with unchanged tickets leaves the stored row untouched.
pub async fn calculate_daily_snapshot(
    db: &Database,
    date: NaiveDate,
    staff_key: Option<&str>,
) -> Result<DailySnapshot, ConvoqaError> {
    let dimension = date_dimension(date);
    dimensions::ensure_date(db, &dimension).await?;

    let counts = tickets::count_tickets_for_date(db, dimension.date_key, staff_key).await?;
    let id = snapshot_id(dimension.date_key, staff_key);
    let snapshot = DailySnapshot {
        snapshot_id: id.clone(),
        date_key: dimension.date_key,
        staff_key: staff_key.map(str::to_string),
        open_tickets_count: counts.open,
        new_tickets_count: counts.new,
        closed_tickets_count: counts.closed,
        calculated_at: now_timestamp(),
    };
    snapshots::upsert_daily_snapshot(db, &snapshot).await?;
    debug!(snapshot_id = %id, open = counts.open, new = counts.new, closed = counts.closed, "snapshot upserted");

    snapshots::get_daily_snapshot(db, &id)
        .await?
        .ok_or_else(|| ConvoqaError::NotFound {
            entity: "snapshot".into(),
            id,
        })
}

/// Aggregate snapshot first, then one per active staff member.
pub async fn calculate_all_daily_snapshots(
    db: &Database,
    date: NaiveDate,
) -> Result<Vec<DailySnapshot>, ConvoqaError> {
    let mut results = vec![calculate_daily_snapshot(db, date, None).await?];
    for staff in dimensions::list_active_staff(db).await? {
        results.push(calculate_daily_snapshot(db, date, Some(&staff.staff_key)).await?);
    }
    info!(date = %date, snapshots = results.len(), "daily snapshots calculated");
    Ok(results)
}
