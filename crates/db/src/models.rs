// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row shapes for the `Analysis`/`AnalysisType`/`AnalysisOutput` tables
//!, and the base64-decoded config blobs a pipeline needs
//! to launch.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cc_core::AnalysisId;

use crate::error::DbError;

/// Resource demand and runtime cap declared by a pipeline's immutable
/// `analysis_type`.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct AnalysisTypeRow {
    pub cpus: i32,
    pub mem: Option<i32>,
    pub disk_space: Option<i32>,
    pub max_run_time_hours: f64,
}

/// One row of the `Analysis` table as read by the workers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PipelineRow {
    pub analysis_id: i64,
    pub name: String,
    pub analysis_type_id: i64,
    pub status_id: i64,
    pub error_id: Option<i64>,
    pub cost: Option<f64>,
    pub git_commit: Option<String>,
    pub final_output_dir: String,
}

impl PipelineRow {
    pub fn id(&self) -> AnalysisId {
        AnalysisId::new(self.analysis_id)
    }
}

/// Base64-decoded config blobs for one pipeline, assembled from the
/// `analysis_type` join per `DBHelper.py`'s `get_config_file_strings`.
#[derive(Debug, Clone)]
pub struct ConfigBlobs {
    pub graph: Vec<u8>,
    pub resource_kit: Vec<u8>,
    pub platform: Vec<u8>,
    pub sample_sheet: Vec<u8>,
    pub startup_script: Option<Vec<u8>>,
}

impl ConfigBlobs {
    /// Decode the four mandatory blobs plus the optional startup script
    /// from their base64-encoded DB-column form.
    pub fn decode(
        graph_b64: &str,
        resource_kit_b64: &str,
        platform_b64: &str,
        sample_sheet_b64: &str,
        startup_script_b64: Option<&str>,
    ) -> Result<Self, DbError> {
        Ok(Self {
            graph: decode_field("graph", graph_b64)?,
            resource_kit: decode_field("resource_kit", resource_kit_b64)?,
            platform: decode_field("platform", platform_b64)?,
            sample_sheet: decode_field("sample_sheet", sample_sheet_b64)?,
            startup_script: startup_script_b64
                .map(|s| decode_field("startup_script", s))
                .transpose()?,
        })
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, DbError> {
    BASE64
        .decode(value)
        .map_err(|source| DbError::Base64 { field, source })
}

/// One declared QC stat row, keyed the way `ReportWorker.py`'s `QCStat`
/// dedup key is formed: `(sample, metric, task, source_file)`.
#[derive(Debug, Clone, PartialEq)]
pub struct QcStatRow {
    pub sample: String,
    pub metric: String,
    pub value: String,
    pub task_id: String,
    pub source_file: String,
    pub notes: String,
}

impl QcStatRow {
    pub fn dedup_key(&self) -> String {
        format!("{}_{}_{}_{}", self.sample, self.metric, self.task_id, self.source_file)
    }
}

/// A status or error-type row as synchronized at startup:
/// "for each known name the gateway ensures a row exists (insert-if-absent)
/// and caches the id."
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct NamedRow {
    pub id: i64,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
