// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML configuration schema from spec.md §6, validated the way
//! `original_source/Config/Validatable.py`/`ConfigParser.py` validate per
//! section: one `validate()` per sub-config, surfaced together as a single
//! [`ConfigError`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_daemon_sleep_time() -> u64 {
    60
}

fn default_worker_sleep_time() -> u64 {
    5
}

/// Top-level daemon configuration, schema per spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub db_helper: DbHelperConfig,
    pub pipeline_queue: PipelineQueueConfig,
    pub platform: PlatformConfig,
    pub report_queue: ReportQueueConfig,
    pub email_reporter: EmailReporterConfig,
    pub email_recipients: Vec<String>,
    #[serde(default = "default_daemon_sleep_time")]
    pub daemon_sleep_time: u64,
    #[serde(default = "default_worker_sleep_time")]
    pub worker_sleep_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbHelperConfig {
    pub username: String,
    pub password: String,
    pub database: String,
    pub host: String,
    /// Carried through unchanged from spec.md §6's config contract; the
    /// Database Gateway itself is `sqlx`-over-Postgres (see DESIGN.md), so
    /// this field is accepted for schema compatibility but not consulted
    /// when building the connection URL.
    pub mysql_driver: String,
}

impl DbHelperConfig {
    /// Postgres connection URL built from the section's fields.
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}/{}",
            self.username, self.password, self.host, self.database
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineQueueConfig {
    pub max_cpus: u32,
    pub max_loading: u32,
}

impl PipelineQueueConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cpus == 0 {
            return Err(ConfigError::Invalid(
                "pipeline_queue.max_cpus must be positive".to_string(),
            ));
        }
        if self.max_loading == 0 {
            return Err(ConfigError::Invalid(
                "pipeline_queue.max_loading must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Driver-specific platform settings (spec.md §6: "platform {…driver-specific…}").
/// The concrete cloud driver is out of scope; this carries the one field
/// `cc-engine`'s Launch Worker needs — an optional pinned execution-engine
/// commit — plus an open bag for whatever a concrete driver needs later.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlatformConfig {
    pub pinned_commit: Option<String>,
    #[serde(flatten)]
    pub extra: std::collections::BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQueueConfig {
    pub report_sub: String,
    pub report_topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailReporterConfig {
    pub subject_prefix: String,
    pub sender_address: String,
    pub sender_pwd: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Parse and validate a config file, mirroring `ConfigParser`'s
    /// parse-then-validate sequence.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline_queue.validate()?;
        if self.email_recipients.is_empty() {
            return Err(ConfigError::Invalid(
                "email_recipients must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn daemon_sleep_duration(&self) -> Duration {
        Duration::from_secs(self.daemon_sleep_time)
    }

    pub fn worker_sleep_duration(&self) -> Duration {
        Duration::from_secs(self.worker_sleep_time)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
