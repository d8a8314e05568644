// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline lifecycle status
//!
//! ```text
//! IDLE → READY → LOADING → RUNNING → FINISHED → {SUCCESS | FAILED}
//!                    │         │           ↑
//!                    └────CANCELLING───────┘
//!                               │
//!                          DESTROYING → FINISHED
//! ```

use serde::{Deserialize, Serialize};

/// Closed enumeration of pipeline lifecycle states.
///
/// The only string conversion lives at the DB boundary (`as_db_str` /
/// `from_db_str`); in-process code always matches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Idle,
    Ready,
    Loading,
    Running,
    Cancelling,
    Destroying,
    Finished,
    Success,
    Failed,
}

impl Status {
    /// All variants, in the order the status table is synchronized.
    pub const ALL: [Status; 9] = [
        Status::Idle,
        Status::Ready,
        Status::Loading,
        Status::Running,
        Status::Cancelling,
        Status::Destroying,
        Status::Finished,
        Status::Success,
        Status::Failed,
    ];

    /// SUCCESS and FAILED are terminal; no other state is.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failed)
    }

    /// Active means neither IDLE nor terminal (the glossary's definition).
    pub fn is_active(self) -> bool {
        !matches!(self, Status::Idle) && !self.is_terminal()
    }

    /// Counts toward the loading-slot admission cap.
    pub fn is_loading_slot(self) -> bool {
        matches!(self, Status::Ready | Status::Loading)
    }

    /// Lower-case description stored in the DB's status table.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Ready => "ready",
            Status::Loading => "loading",
            Status::Running => "running",
            Status::Cancelling => "cancelling",
            Status::Destroying => "destroying",
            Status::Finished => "finished",
            Status::Success => "success",
            Status::Failed => "failed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Status> {
        Some(match s {
            "idle" => Status::Idle,
            "ready" => Status::Ready,
            "loading" => Status::Loading,
            "running" => Status::Running,
            "cancelling" => Status::Cancelling,
            "destroying" => Status::Destroying,
            "finished" => Status::Finished,
            "success" => Status::Success,
            "failed" => Status::Failed,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
