// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PipelineRunner<P>`: the in-memory task driving one pipeline through its
//! lifecycle on its own `PlatformDriver`. Grounded verbatim on
//! `PipelineRunner.py`'s `run`/`cancel`/`finalize` state body.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cc_adapters::{LaunchConfig, PlatformDriver};
use cc_core::{AnalysisId, Clock, ErrorType, ResourceDemand, RunnerHandle, Status};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::EngineError;

/// Bound on `cancel_launch`'s wait for a platform handle to appear before
/// force-stopping it.
const CANCEL_LAUNCH_TIMEOUT: Duration = Duration::from_secs(500);

/// Drives one pipeline through LOADING → RUNNING → FINISHED on its own
/// `PlatformDriver`. Constructed by the Launch Worker, spawned as an
/// independent `tokio` task, and read through the `RunnerHandle` seam by
/// the `PipelineQueue` and the Run Worker.
pub struct PipelineRunner<P: PlatformDriver> {
    id: AnalysisId,
    name: String,
    platform: Arc<P>,
    demand: ResourceDemand,
    commit_id: Option<String>,
    config: LaunchConfig,
    clock: Arc<dyn Clock>,
    #[allow(dead_code)]
    create_time: DateTime<Utc>,
    start_time: Mutex<Option<DateTime<Utc>>>,
    end_time: Mutex<Option<DateTime<Utc>>>,
    status: Mutex<Status>,
    err: Mutex<(ErrorType, String)>,
    started: AtomicBool,
}

impl<P: PlatformDriver> PipelineRunner<P> {
    /// Construct a fresh runner. `platform.set_final_output_dir` is called
    /// immediately, matching `PipelineRunner.py.__init__`'s
    /// `self.platform.set_final_output_dir(self.final_output_dir)`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: AnalysisId,
        name: impl Into<String>,
        platform: Arc<P>,
        demand: ResourceDemand,
        commit_id: Option<String>,
        config: LaunchConfig,
        final_output_dir: PathBuf,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        platform.set_final_output_dir(&final_output_dir);
        let now = clock.now();
        Arc::new(Self {
            id,
            name: name.into(),
            platform,
            demand,
            commit_id,
            config,
            clock,
            create_time: now,
            start_time: Mutex::new(None),
            end_time: Mutex::new(None),
            status: Mutex::new(Status::Ready),
            err: Mutex::new((ErrorType::None, String::new())),
            started: AtomicBool::new(false),
        })
    }

    /// Spawn the single-shot execution body as an independent task. Fails
    /// if this runner has already been spawned once.
    pub fn spawn(self: Arc<Self>) -> Result<tokio::task::JoinHandle<()>, EngineError>
    where
        P: 'static,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(EngineError::AlreadyStarted(self.id));
        }
        Ok(tokio::spawn(async move { self.run_body().await }))
    }

    fn status_locked(&self) -> Status {
        *self.status.lock()
    }

    fn set_status(&self, status: Status) {
        *self.status.lock() = status;
    }

    /// Capture a platform failure's `err_type` from the status *at the time
    /// of failure* — LOAD while LOADING, RUN while RUNNING — preserving the
    /// underlying message.
    fn capture_failure(&self, msg: String) {
        let err_type = match self.status_locked() {
            Status::Loading => ErrorType::Load,
            Status::Running => ErrorType::Run,
            _ => ErrorType::Other,
        };
        tracing::error!(id = %self.id, %err_type, "pipeline runner failed");
        *self.err.lock() = (err_type, msg);
    }

    /// Launch, cancel-checkpoint, run. Errors are captured, never
    /// propagated — the teardown below always runs.
    async fn run_body(self: Arc<Self>) {
        *self.start_time.lock() = Some(self.clock.now());
        self.set_status(Status::Loading);

        let outcome = async {
            self.platform
                .launch(&self.config, self.commit_id.as_deref())
                .await
                .map_err(|e| e.to_string())?;

            if self.status_locked() == Status::Cancelling {
                // Treated as if launch failed with a cancel; err_type/err_msg
                // were already set by cancel().
                return Err(String::new());
            }

            self.set_status(Status::Running);
            self.platform
                .run_cc()
                .await
                .map_err(|e| e.to_string())?;

            tracing::info!(id = %self.id, "pipeline completed successfully");
            Ok(())
        }
        .await;

        if let Err(msg) = outcome {
            if !msg.is_empty() {
                self.capture_failure(msg);
            }
        }

        *self.end_time.lock() = Some(self.clock.now());
        self.finalize().await;
    }

    /// Idempotent teardown: no-op once DESTROYING or FINISHED; otherwise
    /// destroys the platform and marks FINISHED regardless of whether
    /// teardown succeeded.
    async fn finalize(&self) {
        {
            let mut status = self.status.lock();
            if matches!(*status, Status::Destroying | Status::Finished) {
                return;
            }
            *status = Status::Destroying;
        }

        tracing::info!(id = %self.id, "finalizing pipeline runner");
        if let Err(e) = self.platform.finalize().await {
            tracing::error!(id = %self.id, error = %e, "error finalizing pipeline runner");
        }

        self.set_status(Status::Finished);
    }
}

#[async_trait]
impl<P: PlatformDriver> RunnerHandle for PipelineRunner<P> {
    fn id(&self) -> AnalysisId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn demand(&self) -> ResourceDemand {
        self.demand
    }

    fn status(&self) -> Status {
        self.status_locked()
    }

    fn err(&self) -> (ErrorType, String) {
        self.err.lock().clone()
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        *self.start_time.lock()
    }

    fn end_time(&self) -> Option<DateTime<Utc>> {
        *self.end_time.lock()
    }

    /// The external interrupt, callable at any time. No-op if already
    /// DESTROYING, FINISHED, or CANCELLING.
    async fn cancel(&self) {
        let prev_status = {
            let mut status = self.status.lock();
            if matches!(
                *status,
                Status::Destroying | Status::Finished | Status::Cancelling
            ) {
                return;
            }
            let prev = *status;
            *status = Status::Cancelling;
            prev
        };

        tracing::warn!(id = %self.id, "pipeline cancelled");
        *self.err.lock() = (ErrorType::Cancel, "pipeline cancelled".to_string());

        match prev_status {
            Status::Running => {
                if let Err(e) = self.platform.cancel_cc().await {
                    tracing::warn!(id = %self.id, error = %e, "error sending cancel signal");
                }
            }
            Status::Loading => {
                if let Err(e) = self.platform.cancel_launch(CANCEL_LAUNCH_TIMEOUT).await {
                    tracing::warn!(id = %self.id, error = %e, "error cancelling launch");
                }
            }
            _ => {}
        }
    }

    async fn force_finalize(&self) {
        self.finalize().await;
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
