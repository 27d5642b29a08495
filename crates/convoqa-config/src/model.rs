// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typo in a config key
//! is a startup error instead of a silently ignored setting.

use serde::{Deserialize, Serialize};

/// Top-level Convoqa configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConvoqaConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Incremental analysis batch settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// External analyzer service.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Warehouse database.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP control surface.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Working-hours calendar used for ticket time metrics.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Upstream record ingestion.
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Candidate selection and reconciliation behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Minimum number of unanalyzed messages before a conversation is a candidate.
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Log what would be analyzed without calling the analyzer or writing.
    #[serde(default)]
    pub dry_run: bool,

    /// Skip the ingestion step when a batch is triggered over HTTP.
    #[serde(default)]
    pub skip_ingestion: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            dry_run: false,
            skip_ingestion: false,
        }
    }
}

fn default_threshold() -> u32 {
    25
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Base URL; the client posts to `{base_url}/analyze`.
    #[serde(default = "default_analyzer_base_url")]
    pub base_url: String,

    /// Optional bearer token sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_analyzer_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient statuses (429, 500, 502, 503) before giving up.
    #[serde(default = "default_analyzer_max_retries")]
    pub max_retries: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: default_analyzer_base_url(),
            api_key: None,
            timeout_secs: default_analyzer_timeout_secs(),
            max_retries: default_analyzer_max_retries(),
        }
    }
}

fn default_analyzer_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_analyzer_timeout_secs() -> u64 {
    120
}

fn default_analyzer_max_retries() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite warehouse file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    "convoqa.db".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

/// Working-hours calendar.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// Offset of business-local time from UTC, in minutes.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// Working minutes credited per real day by the long-span estimator.
    #[serde(default = "default_average_working_minutes")]
    pub average_working_minutes_per_day: u32,

    /// Spans at or above this many real minutes use the estimator.
    #[serde(default = "default_estimate_threshold")]
    pub estimate_threshold_minutes: u32,

    #[serde(default)]
    pub schedule: WeeklySchedule,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            average_working_minutes_per_day: default_average_working_minutes(),
            estimate_threshold_minutes: default_estimate_threshold(),
            schedule: WeeklySchedule::default(),
        }
    }
}

fn default_utc_offset_minutes() -> i32 {
    420
}

fn default_average_working_minutes() -> u32 {
    420
}

fn default_estimate_threshold() -> u32 {
    1440
}

/// `[start_minute, end_minute]` since local midnight. Both ends count as working.
pub type MinuteRange = [u32; 2];

/// Working ranges per day of week. A day omitted from the file keeps its
/// default; an empty list means no working hours that day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeeklySchedule {
    pub sunday: Vec<MinuteRange>,
    pub monday: Vec<MinuteRange>,
    pub tuesday: Vec<MinuteRange>,
    pub wednesday: Vec<MinuteRange>,
    pub thursday: Vec<MinuteRange>,
    pub friday: Vec<MinuteRange>,
    pub saturday: Vec<MinuteRange>,
}

impl WeeklySchedule {
    /// Ranges for a day, indexed from Sunday = 0.
    pub fn day(&self, days_from_sunday: u32) -> &[MinuteRange] {
        match days_from_sunday {
            0 => self.sunday.as_slice(),
            1 => self.monday.as_slice(),
            2 => self.tuesday.as_slice(),
            3 => self.wednesday.as_slice(),
            4 => self.thursday.as_slice(),
            5 => self.friday.as_slice(),
            6 => self.saturday.as_slice(),
            _ => &[],
        }
    }

    /// `(day name, ranges)` pairs from Sunday to Saturday.
    pub fn days(&self) -> [(&'static str, &[MinuteRange]); 7] {
        [
            ("sunday", self.sunday.as_slice()),
            ("monday", self.monday.as_slice()),
            ("tuesday", self.tuesday.as_slice()),
            ("wednesday", self.wednesday.as_slice()),
            ("thursday", self.thursday.as_slice()),
            ("friday", self.friday.as_slice()),
            ("saturday", self.saturday.as_slice()),
        ]
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        let weekend = vec![[480, 690], [780, 1020]];
        let afternoon = vec![[780, 1140]];
        Self {
            sunday: weekend.clone(),
            monday: afternoon.clone(),
            tuesday: vec![[540, 690], [780, 1140]],
            wednesday: afternoon.clone(),
            thursday: afternoon.clone(),
            friday: afternoon,
            saturday: weekend,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestionConfig {
    /// Page id whose own messages count as staff messages.
    #[serde(default)]
    pub page_id: Option<String>,

    /// JSON dump of upstream conversations to ingest.
    #[serde(default)]
    pub source_file: Option<String>,

    /// Pause between consecutive per-conversation reads.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            page_id: None,
            source_file: None,
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

fn default_request_delay_ms() -> u64 {
    200
}
