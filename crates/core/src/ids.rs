// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain identifiers

use serde::{Deserialize, Serialize};

/// The DB's stable numeric pipeline identifier. Queue lookups key on its
/// `Display` impl where a string key is needed (matching
/// `PipelineQueue.pipeline_workers` in the original source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnalysisId(pub i64);

impl AnalysisId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AnalysisId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

crate::define_id! {
    /// Opaque ack handle for a pulled report message.
    pub struct ReportId;
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
