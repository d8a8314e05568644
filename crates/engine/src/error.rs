// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from `cc-engine`.

use cc_core::AnalysisId;
use thiserror::Error;

/// Platform errors never escape a [`crate::runner::PipelineRunner`] body —
/// they are captured into its `err_type`/`err_msg` fields instead. This
/// enum covers the one failure mode that is the caller's fault rather
/// than the platform's: attempting to spawn the same runner's single-shot
/// execution body twice.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("pipeline runner {0} has already been started")]
    AlreadyStarted(AnalysisId),
}
