// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Working-hours calendar.
//!
//! Maps instants to "inside business hours" using a weekly schedule in a
//! fixed business-local offset, and integrates working minutes over spans:
//! exactly (one step per minute) for short spans, by a per-day average for
//! long ones.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use convoqa_config::model::{CalendarConfig, WeeklySchedule};
use convoqa_core::ConvoqaError;

const MINUTES_PER_DAY: f64 = 1440.0;

#[derive(Debug, Clone)]
pub struct WorkingCalendar {
    offset: FixedOffset,
    schedule: WeeklySchedule,
    average_working_minutes_per_day: u32,
    estimate_threshold_minutes: u32,
}

impl WorkingCalendar {
    pub fn new(config: &CalendarConfig) -> Result<Self, ConvoqaError> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            ConvoqaError::Config(format!(
                "calendar.utc_offset_minutes {} is out of range",
                config.utc_offset_minutes
            ))
        })?;
        Ok(Self {
            offset,
            schedule: config.schedule.clone(),
            average_working_minutes_per_day: config.average_working_minutes_per_day,
            estimate_threshold_minutes: config.estimate_threshold_minutes,
        })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// True iff the local minute-of-day of `at` falls inside one of its
    /// weekday's ranges. Both range ends count as working.
    pub fn is_working_instant(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.offset);
        let minute = local.hour() * 60 + local.minute();
        self.schedule
            .day(local.weekday().num_days_from_sunday())
            .iter()
            .any(|&[start, end]| minute >= start && minute <= end)
    }

    /// Counts each whole-minute step in `[start, end)` whose starting instant
    /// is a working instant. Zero when `start >= end`.
    pub fn exact_working_minutes(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        let mut count = 0;
        let mut current = start;
        while current < end {
            if self.is_working_instant(current) {
                count += 1;
            }
            current += Duration::minutes(1);
        }
        count
    }

    /// `round(real_minutes / 1440 * average_working_minutes_per_day)`. Zero
    /// when `start >= end`.
    pub fn estimated_working_minutes(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        if start >= end {
            return 0;
        }
        let days = real_minutes(start, end) / MINUTES_PER_DAY;
        (days * f64::from(self.average_working_minutes_per_day)).round() as i64
    }

    /// Exact below the estimate threshold, estimated at or above it.
    pub fn working_minutes_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        if start >= end {
            return 0;
        }
        if real_minutes(start, end) < f64::from(self.estimate_threshold_minutes) {
            self.exact_working_minutes(start, end)
        } else {
            self.estimated_working_minutes(start, end)
        }
    }

    /// Business-local calendar date of `at`.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Business-local `YYYYMMDD` key of `at`.
    pub fn date_key(&self, at: DateTime<Utc>) -> i64 {
        date_key(self.local_date(at))
    }
}

fn real_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

/// `YYYYMMDD` as an integer.
pub fn date_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Parses the timestamp formats found in the warehouse.
///
/// RFC 3339 strings keep their offset; timestamps without an offset are
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn utc_calendar() -> WorkingCalendar {
        WorkingCalendar::new(&CalendarConfig {
            utc_offset_minutes: 0,
            ..CalendarConfig::default()
        })
        .unwrap()
    }

    /// 2026-01-04 is a Sunday: ranges [480, 690] and [780, 1020].
    fn sunday_at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 4, minute / 60, minute % 60, 0)
            .unwrap()
    }

    #[test]
    fn range_boundaries_are_inclusive() {
        let cal = utc_calendar();
        assert!(cal.is_working_instant(sunday_at(480)));
        assert!(cal.is_working_instant(sunday_at(690)));
        assert!(!cal.is_working_instant(sunday_at(479)));
        assert!(!cal.is_working_instant(sunday_at(691)));
        assert!(cal.is_working_instant(sunday_at(1020)));
        assert!(!cal.is_working_instant(sunday_at(1021)));
    }

    #[test]
    fn offset_shifts_the_local_day() {
        // 2026-01-05 01:00 UTC is Monday 08:00 at UTC+7; Monday starts at 13:00.
        let cal = WorkingCalendar::new(&CalendarConfig::default()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 1, 0, 0).unwrap();
        assert!(!cal.is_working_instant(at));
        // Monday 13:00 local.
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 6, 0, 0).unwrap();
        assert!(cal.is_working_instant(at));
        assert_eq!(cal.date_key(Utc.with_ymd_and_hms(2026, 1, 4, 18, 0, 0).unwrap()), 20260105);
    }

    #[test]
    fn exact_minutes_counts_inclusive_end_minute() {
        let cal = utc_calendar();
        // [470, 700): minutes 480..=690 are working = 211.
        assert_eq!(cal.exact_working_minutes(sunday_at(470), sunday_at(700)), 211);
        // Lunch gap only.
        assert_eq!(cal.exact_working_minutes(sunday_at(691), sunday_at(780)), 0);
    }

    #[test]
    fn reversed_or_empty_spans_are_zero() {
        let cal = utc_calendar();
        let t = sunday_at(500);
        assert_eq!(cal.exact_working_minutes(t, t), 0);
        assert_eq!(cal.exact_working_minutes(t, sunday_at(499)), 0);
        assert_eq!(cal.estimated_working_minutes(t, sunday_at(499)), 0);
        assert_eq!(cal.working_minutes_between(t, sunday_at(499)), 0);
    }

    #[test]
    fn full_day_estimate_is_the_daily_average() {
        let cal = utc_calendar();
        let start = sunday_at(0);
        let end = start + Duration::minutes(1440);
        assert_eq!(cal.estimated_working_minutes(start, end), 420);
        assert_eq!(cal.working_minutes_between(start, end), 420);
    }

    #[test]
    fn dispatcher_uses_exact_below_threshold() {
        let cal = utc_calendar();
        let start = sunday_at(0);
        let end = start + Duration::minutes(1439);
        assert_eq!(
            cal.working_minutes_between(start, end),
            cal.exact_working_minutes(start, end)
        );
    }

    #[test]
    fn parses_warehouse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 4, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2026-01-04T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-04T17:00:00+07:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-04T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-04T10:00:00.000000"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-04 10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    proptest! {
        #[test]
        fn exact_never_exceeds_real_minutes(start_min in 0i64..20_000, len in 0i64..1_500) {
            let cal = utc_calendar();
            let start = sunday_at(0) + Duration::minutes(start_min);
            let end = start + Duration::minutes(len);
            let exact = cal.exact_working_minutes(start, end);
            prop_assert!(exact >= 0);
            prop_assert!(exact <= len);
        }

        #[test]
        fn exact_is_additive(start_min in 0i64..10_000, a in 0i64..600, b in 0i64..600) {
            let cal = utc_calendar();
            let s = sunday_at(0) + Duration::minutes(start_min);
            let m = s + Duration::minutes(a);
            let e = m + Duration::minutes(b);
            prop_assert_eq!(
                cal.exact_working_minutes(s, e),
                cal.exact_working_minutes(s, m) + cal.exact_working_minutes(m, e)
            );
        }

        #[test]
        fn estimate_is_monotonic(days in 1i64..60, extra in 0i64..1440) {
            let cal = utc_calendar();
            let s = sunday_at(0);
            let shorter = cal.estimated_working_minutes(s, s + Duration::days(days));
            let longer = cal.estimated_working_minutes(s, s + Duration::days(days) + Duration::minutes(extra));
            prop_assert!(longer >= shorter);
        }
    }
}
