// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between the queue (which only needs to admit, total, and list
//! runners) and the concrete execution logic that drives one (`cc-engine`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error_type::ErrorType;
use crate::ids::AnalysisId;
use crate::status::Status;

/// Resource demand declared by a pipeline's `analysis_type`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceDemand {
    pub cpus: u32,
    pub mem: Option<u32>,
    pub disk: Option<u32>,
    pub max_run_time_hours: f64,
}

/// A live runner as seen by the `PipelineQueue` and the Run Worker.
///
/// Concrete implementations (`cc_engine::PipelineRunner<P>`) own the
/// platform driver and the actual state-machine body; this trait exposes
/// only what admission control, totals bookkeeping, and reconciliation
/// need, mirroring the `SessionAdapter` seam-trait convention.
#[async_trait]
pub trait RunnerHandle: Send + Sync {
    fn id(&self) -> AnalysisId;
    fn name(&self) -> &str;
    fn demand(&self) -> ResourceDemand;
    fn status(&self) -> Status;
    fn err(&self) -> (ErrorType, String);
    fn start_time(&self) -> Option<DateTime<Utc>>;
    fn end_time(&self) -> Option<DateTime<Utc>>;

    /// Requests cancellation: transitions the runner to CANCELLING and lets
    /// its own task drive the rest of the teardown. No-op if the runner is
    /// already DESTROYING, FINISHED, or CANCELLING.
    async fn cancel(&self);

    /// Direct teardown, bypassing the normal cancel-then-wait-for-finalize
    /// path. Used by the Daemon Manager's shutdown sequence when the Run
    /// Worker has stopped draining the queue and a runner's own background
    /// task can no longer be trusted to reach `finalize` on its own.
    /// Idempotent, same as `cancel`'s eventual teardown.
    async fn force_finalize(&self);
}

#[cfg(test)]
#[path = "runner_handle_tests.rs"]
mod tests;
