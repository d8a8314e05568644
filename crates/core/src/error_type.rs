// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline error classification, as recorded in the DB `error_type`.

use serde::{Deserialize, Serialize};

/// Closed enumeration of error classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    /// Success — no error.
    None,
    /// Launch Worker failed to instantiate a runner from the DB record.
    Init,
    /// Platform provisioning failed while LOADING.
    Load,
    /// Remote engine reported a runtime error, or declared outputs are missing.
    Run,
    /// Placeholder: runner believes success, awaiting the authoritative report.
    Report,
    /// Explicit cancel (operator or runtime cap).
    Cancel,
    /// Catch-all, e.g. orphaned at startup.
    Other,
}

impl ErrorType {
    pub const ALL: [ErrorType; 7] = [
        ErrorType::None,
        ErrorType::Init,
        ErrorType::Load,
        ErrorType::Run,
        ErrorType::Report,
        ErrorType::Cancel,
        ErrorType::Other,
    ];

    pub fn as_db_str(self) -> &'static str {
        match self {
            ErrorType::None => "none",
            ErrorType::Init => "init",
            ErrorType::Load => "load",
            ErrorType::Run => "run",
            ErrorType::Report => "report",
            ErrorType::Cancel => "cancel",
            ErrorType::Other => "other",
        }
    }

    pub fn from_db_str(s: &str) -> Option<ErrorType> {
        Some(match s {
            "none" => ErrorType::None,
            "init" => ErrorType::Init,
            "load" => ErrorType::Load,
            "run" => ErrorType::Run,
            "report" => ErrorType::Report,
            "cancel" => ErrorType::Cancel,
            "other" => ErrorType::Other,
            _ => return None,
        })
    }

    /// Canned message synchronized into the DB error table at startup.
    pub fn canned_message(self) -> &'static str {
        match self {
            ErrorType::None => "success",
            ErrorType::Init => "failed to instantiate pipeline runner",
            ErrorType::Load => "platform provisioning failed",
            ErrorType::Run => "pipeline run failed",
            ErrorType::Report => "awaiting completion report",
            ErrorType::Cancel => "pipeline cancelled",
            ErrorType::Other => "unclassified failure",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

#[cfg(test)]
#[path = "error_type_tests.rs"]
mod tests;
