// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Both CLI tools re-parse the daemon's own TOML config file directly
//! rather than talking to a running `ccd`, matching
//! `original_source/CancelPipeline.py`/`ResizeQueue.py`, which each load
//! it via their own `ConfigParser` call.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DbHelperConfig {
    username: String,
    password: String,
    database: String,
    host: String,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    db_helper: DbHelperConfig,
}

/// Build a Postgres connection URL from the config file's `db_helper`
/// section, for `cancel-pipeline`'s direct database access.
pub fn database_url(config_path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read config file {}", config_path.display()))?;
    let config: ConfigFile = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", config_path.display()))?;
    Ok(format!(
        "postgres://{}:{}@{}/{}",
        config.db_helper.username, config.db_helper.password, config.db_helper.host, config.db_helper.database
    ))
}

/// An action `resize-queue` can apply to the `pipeline_queue` section. The
/// original's three-axis `max_cpus`/`max_mem`/`max_disk_space` `MANUAL`
/// action is replaced by the two explicit-value variants matching this
/// crate's CPU + loading-slot admission model (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAction {
    Increase,
    Decrease,
    Lock,
    Reset,
    Cpu(u32),
    Load(u32),
}

impl std::str::FromStr for ResizeAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INCREASE" => Ok(ResizeAction::Increase),
            "DECREASE" => Ok(ResizeAction::Decrease),
            "LOCK" => Ok(ResizeAction::Lock),
            "RESET" => Ok(ResizeAction::Reset),
            _ => {
                if let Some(value) = s.strip_prefix("CPU=") {
                    Ok(ResizeAction::Cpu(
                        value.parse().context("CPU=<n> must be a non-negative integer")?,
                    ))
                } else if let Some(value) = s.strip_prefix("LOAD=") {
                    Ok(ResizeAction::Load(
                        value.parse().context("LOAD=<n> must be a non-negative integer")?,
                    ))
                } else {
                    bail!(
                        "unrecognized action '{s}' (expected INCREASE|DECREASE|LOCK|RESET|CPU=<n>|LOAD=<n>)"
                    )
                }
            }
        }
    }
}

/// Defaults `RESET` restores to, matching the original's `max_cpus = 4`
/// reset value; `max_loading` has no original analog so this picks a
/// conservative default (twice `max_cpus`).
const RESET_MAX_CPUS: u32 = 4;
const RESET_MAX_LOADING: u32 = 8;

/// Apply `action` to the `[pipeline_queue]` table of the config file in
/// place, preserving every other section untouched. Returns the resulting
/// `(max_cpus, max_loading)` for the caller to report.
pub fn apply_resize_action(config_path: &Path, action: ResizeAction) -> Result<(u32, u32)> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read config file {}", config_path.display()))?;
    let mut doc: toml::Value = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", config_path.display()))?;

    let queue = doc
        .get_mut("pipeline_queue")
        .and_then(toml::Value::as_table_mut)
        .context("config file is missing a [pipeline_queue] section")?;

    let max_cpus = queue
        .get("max_cpus")
        .and_then(toml::Value::as_integer)
        .context("pipeline_queue.max_cpus is missing or not an integer")? as u32;
    let max_loading = queue
        .get("max_loading")
        .and_then(toml::Value::as_integer)
        .context("pipeline_queue.max_loading is missing or not an integer")? as u32;

    let (new_cpus, new_loading) = match action {
        ResizeAction::Increase => (max_cpus * 2, max_loading * 2),
        ResizeAction::Decrease => (max_cpus / 2, max_loading / 2),
        ResizeAction::Lock => (0, 0),
        ResizeAction::Reset => (RESET_MAX_CPUS, RESET_MAX_LOADING),
        ResizeAction::Cpu(n) => (n, max_loading),
        ResizeAction::Load(n) => (max_cpus, n),
    };

    queue.insert("max_cpus".to_string(), toml::Value::Integer(new_cpus.into()));
    queue.insert("max_loading".to_string(), toml::Value::Integer(new_loading.into()));

    let serialized = toml::to_string_pretty(&doc).context("failed to serialize config")?;
    std::fs::write(config_path, serialized)
        .with_context(|| format!("failed to write config file {}", config_path.display()))?;

    Ok((new_cpus, new_loading))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
