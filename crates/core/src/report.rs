// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion report pulled from the report queue.

use serde::{Deserialize, Serialize};

use crate::ids::{AnalysisId, ReportId};

/// One declared output file and whether the Report Worker actually found it
/// on disk when it went to register it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: String,
    pub file_type: String,
    pub task_id: String,
    pub found: bool,
}

/// A completion report as delivered by the remote engine, after the wire
/// payload (`RawReport` in `cc-adapters`) has been parsed and matched to an
/// ack handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: ReportId,
    pub pipeline_id: AnalysisId,
    pub success: bool,
    pub error: Option<String>,
    pub total_cost: Option<f64>,
    pub git_commit: Option<String>,
    pub files: Vec<OutputFile>,
}

impl Report {
    /// Files declared but not found on disk; a non-empty result downgrades
    /// an otherwise-successful report to FAILED.
    pub fn missing_files(&self) -> Vec<&OutputFile> {
        self.files.iter().filter(|f| !f.found).collect()
    }

    pub fn has_missing_files(&self) -> bool {
        self.files.iter().any(|f| !f.found)
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
