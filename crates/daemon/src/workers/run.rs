// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run Worker: reconciles each live runner's status with the database,
//! enforces the per-pipeline runtime cap, and retires finished runners
//! from the queue. Grounded on `original_source/GAPDaemon/Workers/RunWorker.py`.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use cc_core::{Clock, ErrorType, PipelineQueue, RunnerHandle, Status, hours_between};
use cc_db::DatabaseGateway;
use tracing::{info, instrument};

use super::WorkerTask;
use crate::error::DaemonError;

/// The DB status + error_type a FINISHED runner's captured error maps to,
/// per spec.md §4.4's provisional-write table.
fn finished_outcome(err_type: ErrorType, err_msg: &str) -> (Status, ErrorType, String) {
    match err_type {
        ErrorType::None => (
            Status::Failed,
            ErrorType::Report,
            ErrorType::Report.canned_message().to_string(),
        ),
        ErrorType::Cancel => (Status::Failed, ErrorType::Cancel, err_msg.to_string()),
        other => (Status::Failed, other, err_msg.to_string()),
    }
}

pub struct RunWorker {
    db: Arc<DatabaseGateway>,
    queue: Arc<PipelineQueue>,
    clock: Arc<dyn Clock>,
}

impl RunWorker {
    pub fn new(db: Arc<DatabaseGateway>, queue: Arc<PipelineQueue>, clock: Arc<dyn Clock>) -> Self {
        Self { db, queue, clock }
    }

    #[instrument(skip(self, runner))]
    async fn reconcile_one(&self, runner: &Arc<dyn RunnerHandle>) -> Result<(), DaemonError> {
        let id = runner.id();
        let curr = runner.status();
        let mut tx = self.db.begin().await?;

        match curr {
            Status::Ready | Status::Loading | Status::Running => {
                let db_status = self.db.current_status(&mut tx, id).await?;
                if db_status == Status::Cancelling {
                    runner.cancel().await;
                } else {
                    if db_status != curr {
                        self.db.update_status(&mut tx, id, curr).await?;
                    }
                    let demand = runner.demand();
                    if let Some(start) = runner.start_time() {
                        let elapsed = hours_between(start, self.clock.now());
                        if elapsed > demand.max_run_time_hours {
                            info!(id = %id, elapsed, cap = demand.max_run_time_hours, "runtime cap exceeded");
                            runner.cancel().await;
                        }
                    }
                }
            }
            Status::Finished => {
                if let (Some(start), Some(end)) = (runner.start_time(), runner.end_time()) {
                    self.db.set_run_time_hours(&mut tx, id, hours_between(start, end)).await?;
                }

                let (err_type, err_msg) = runner.err();
                let (status, outcome_type, msg) = finished_outcome(err_type, &err_msg);
                self.db.update_status(&mut tx, id, status).await?;
                self.db.update_error_type(&mut tx, id, outcome_type, &msg).await?;

                self.queue.remove(id);
                info!(id = %id, err_type = %outcome_type, "runner retired");
            }
            Status::Cancelling | Status::Destroying => {
                // Transient; nothing to reconcile until the next observed
                // state (RUNNING/LOADING's cancel path or FINISHED).
            }
            Status::Idle | Status::Success | Status::Failed => {
                // A RunnerHandle never reports these; defensive no-op.
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl WorkerTask for RunWorker {
    fn name(&self) -> &'static str {
        "run"
    }

    async fn tick(&self, _stop: &AtomicBool) -> Result<(), DaemonError> {
        for runner in self.queue.snapshot_all() {
            self.reconcile_one(&runner).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
