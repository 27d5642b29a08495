// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Convoqa configuration system.

use convoqa_config::diagnostic::ConfigError;
use convoqa_config::model::{ConvoqaConfig, WeeklySchedule};
use convoqa_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[agent]
log_level = "debug"

[analysis]
threshold = 10
dry_run = true

[analyzer]
base_url = "https://audit.internal"
api_key = "secret"
max_retries = 0

[storage]
database_path = "/tmp/warehouse.db"
wal_mode = false

[gateway]
host = "0.0.0.0"
port = 8080

[calendar]
utc_offset_minutes = 0

[calendar.schedule]
monday = [[540, 1020]]
sunday = []

[ingestion]
page_id = "page-1"
request_delay_ms = 0
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.analysis.threshold, 10);
    assert!(config.analysis.dry_run);
    assert!(!config.analysis.skip_ingestion);
    assert_eq!(config.analyzer.base_url, "https://audit.internal");
    assert_eq!(config.analyzer.api_key.as_deref(), Some("secret"));
    assert_eq!(config.analyzer.max_retries, 0);
    assert_eq!(config.storage.database_path, "/tmp/warehouse.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.calendar.utc_offset_minutes, 0);
    assert_eq!(config.calendar.schedule.monday, vec![[540, 1020]]);
    assert!(config.calendar.schedule.sunday.is_empty());
    // Days not mentioned keep their defaults.
    assert_eq!(
        config.calendar.schedule.tuesday,
        WeeklySchedule::default().tuesday
    );
    assert_eq!(config.ingestion.page_id.as_deref(), Some("page-1"));
}

#[test]
fn defaults_match_documented_values() {
    let config = ConvoqaConfig::default();
    assert_eq!(config.analysis.threshold, 25);
    assert!(!config.analysis.dry_run);
    assert!(!config.analysis.skip_ingestion);
    assert_eq!(config.analyzer.base_url, "http://localhost:8000");
    assert_eq!(config.gateway.port, 3000);
    assert_eq!(config.calendar.average_working_minutes_per_day, 420);
    assert_eq!(config.calendar.estimate_threshold_minutes, 1440);
    assert_eq!(config.calendar.schedule.saturday, vec![[480, 690], [780, 1020]]);
    assert_eq!(config.calendar.schedule.wednesday, vec![[780, 1140]]);
    assert_eq!(config.ingestion.request_delay_ms, 200);
}

#[test]
fn unknown_field_suggests_correction() {
    let toml = r#"
[analysis]
treshold = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key should fail");
    let suggested = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "treshold" && s == "threshold"
        )
    });
    assert!(suggested, "expected a `threshold` suggestion, got {errors:?}");
}

#[test]
fn non_numeric_threshold_is_a_type_error() {
    let toml = r#"
[analysis]
threshold = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("string threshold should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("threshold"))),
        "got {errors:?}"
    );
}

#[test]
fn negative_threshold_is_rejected() {
    let toml = r#"
[analysis]
threshold = -1
"#;
    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn validation_rejects_out_of_range_schedule() {
    let toml = r#"
[calendar.schedule]
friday = [[780, 1500]]
"#;

    let errors = load_and_validate_str(toml).expect_err("range past midnight should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("friday"))
    }));
}

#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: ConvoqaConfig = Figment::new()
        .merge(Serialized::defaults(ConvoqaConfig::default()))
        .merge(Toml::file("/nonexistent/path/convoqa.toml"))
        .extract()
        .expect("missing file should be silently skipped");
    assert_eq!(config.analysis.threshold, 25);
}

#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "treshold".to_string(),
        suggestion: Some("threshold".to_string()),
        valid_keys: "threshold, dry_run, skip_ingestion".to_string(),
        span: None,
        src: None,
    };

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("treshold"));
    assert!(buf.contains("did you mean `threshold`"));
}
