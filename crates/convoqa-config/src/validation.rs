// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ConvoqaConfig;

const MINUTES_PER_DAY: u32 = 1440;
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &ConvoqaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let base_url = config.analyzer.base_url.trim();
    if base_url.is_empty() {
        fail("analyzer.base_url must not be empty".to_string());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "analyzer.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.analyzer.timeout_secs == 0 {
        fail("analyzer.timeout_secs must be greater than 0".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    let host_ok = host.parse::<std::net::IpAddr>().is_ok()
        || (!host.is_empty()
            && host
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-'));
    if !host_ok {
        fail(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        ));
    }

    let calendar = &config.calendar;
    if calendar.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        fail(format!(
            "calendar.utc_offset_minutes must be within ±{MAX_UTC_OFFSET_MINUTES}, got {}",
            calendar.utc_offset_minutes
        ));
    }
    if calendar.average_working_minutes_per_day > MINUTES_PER_DAY {
        fail(format!(
            "calendar.average_working_minutes_per_day must be at most {MINUTES_PER_DAY}, got {}",
            calendar.average_working_minutes_per_day
        ));
    }
    if calendar.estimate_threshold_minutes == 0 {
        fail("calendar.estimate_threshold_minutes must be greater than 0".to_string());
    }

    for (day, ranges) in calendar.schedule.days() {
        let mut previous_end: Option<u32> = None;
        for &[start, end] in ranges {
            if start > end || end > MINUTES_PER_DAY {
                fail(format!(
                    "calendar.schedule.{day}: range [{start}, {end}] must satisfy 0 <= start <= end <= {MINUTES_PER_DAY}"
                ));
            }
            if let Some(prev) = previous_end
                && start <= prev
            {
                fail(format!(
                    "calendar.schedule.{day}: range [{start}, {end}] overlaps or precedes the previous range ending at {prev}"
                ));
            }
            previous_end = Some(end);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&ConvoqaConfig::default()).is_ok());
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let mut config = ConvoqaConfig::default();
        config.calendar.schedule.monday = vec![[480, 700], [690, 900]];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("monday"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ConvoqaConfig::default();
        config.analyzer.base_url = "ftp://nope".into();
        config.storage.database_path = "  ".into();
        config.calendar.schedule.sunday = vec![[700, 600]];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn schedule_from_toml_keeps_omitted_days() {
        let toml_str = r#"
[calendar.schedule]
monday = [[600, 660]]
sunday = []
"#;
        let config: ConvoqaConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.calendar.schedule.monday, vec![[600, 660]]);
        assert!(config.calendar.schedule.sunday.is_empty());
        assert_eq!(
            config.calendar.schedule.tuesday,
            crate::model::WeeklySchedule::default().tuesday
        );
    }

    #[test]
    fn end_past_midnight_is_rejected() {
        let toml_str = r#"
[calendar.schedule]
friday = [[780, 1500]]
"#;
        let config: ConvoqaConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("friday"));
    }
}
