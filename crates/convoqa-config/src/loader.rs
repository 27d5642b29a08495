// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./convoqa.toml` > `~/.config/convoqa/convoqa.toml` >
//! `/etc/convoqa/convoqa.toml`, with `CONVOQA_*` overrides and a handful of
//! bare legacy variables (`ANALYSIS_THRESHOLD`, `DRY_RUN`, ...) on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ConvoqaConfig;

/// Bare environment variables honored for deployments that predate the
/// `CONVOQA_` prefix, with the config key each one sets.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("analysis_threshold", "analysis.threshold"),
    ("dry_run", "analysis.dry_run"),
    ("skip_ingestion", "analysis.skip_ingestion"),
    ("analyzer_base_url", "analyzer.base_url"),
    ("database_path", "storage.database_path"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/convoqa/convoqa.toml`
/// 3. `~/.config/convoqa/convoqa.toml`
/// 4. `./convoqa.toml`
/// 5. `CONVOQA_*` environment variables
/// 6. Legacy bare environment variables
pub fn load_config() -> Result<ConvoqaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<ConvoqaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConvoqaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConvoqaConfig, figment::Error> {
    with_env(
        Figment::new()
            .merge(Serialized::defaults(ConvoqaConfig::default()))
            .merge(Toml::file(path)),
    )
    .extract()
}

/// Build the Figment used by [`load_config`] without extracting it.
pub fn build_figment() -> Figment {
    with_env(
        Figment::new()
            .merge(Serialized::defaults(ConvoqaConfig::default()))
            .merge(Toml::file("/etc/convoqa/convoqa.toml"))
            .merge(Toml::file(
                dirs::config_dir()
                    .map(|d| d.join("convoqa/convoqa.toml"))
                    .unwrap_or_default(),
            ))
            .merge(Toml::file("convoqa.toml")),
    )
}

/// Layer both environment providers on top of `figment`.
pub fn with_env(figment: Figment) -> Figment {
    figment.merge(env_provider()).merge(legacy_env_provider())
}

/// `CONVOQA_<SECTION>_<KEY>` → `<section>.<key>`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CONVOQA_ANALYZER_BASE_URL` must become `analyzer.base_url`.
fn env_provider() -> Env {
    Env::prefixed("CONVOQA_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let section = [
            "agent_",
            "analysis_",
            "analyzer_",
            "storage_",
            "gateway_",
            "calendar_",
            "ingestion_",
        ]
        .into_iter()
        .find(|prefix| key_str.starts_with(prefix));
        match section {
            Some(prefix) => key_str.replacen(prefix, &prefix.replace('_', "."), 1).into(),
            None => key_str.into(),
        }
    })
}

fn legacy_env_provider() -> Env {
    let names: Vec<&str> = LEGACY_ENV_KEYS.iter().map(|(env, _)| *env).collect();
    Env::raw().only(&names).map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        LEGACY_ENV_KEYS
            .iter()
            .find(|(env, _)| *env == key_str)
            .map(|(_, path)| (*path).to_string())
            .unwrap_or(key_str)
            .into()
    })
}
