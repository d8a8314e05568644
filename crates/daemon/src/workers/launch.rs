// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch Worker: discovers IDLE pipelines, admits them against the
//! [`PipelineQueue`]'s caps, and starts a [`PipelineRunner`] for each one
//! admitted. Grounded on `original_source/CCDaemon/Workers/LaunchWorker.py`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cc_adapters::{LaunchConfig, PlatformFactory};
use cc_core::{Clock, ErrorType, PipelineQueue, ResourceDemand, RunnerHandle, Status};
use cc_db::{AnalysisTypeRow, DatabaseGateway, PipelineRow};
use cc_engine::PipelineRunner;
use sqlx::PgConnection;
use tracing::{info, instrument, warn};

use super::WorkerTask;
use crate::error::DaemonError;

/// Non-negative `i32` DB column to `u32`, dropping negative values (which
/// should never occur for `cpus`/`mem`/`disk_space`) to `None`/`0`.
fn resource_u32(value: Option<i32>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

pub struct LaunchWorker<F: PlatformFactory> {
    db: Arc<DatabaseGateway>,
    queue: Arc<PipelineQueue>,
    factory: Arc<F>,
    clock: Arc<dyn Clock>,
    pinned_commit: Option<String>,
}

impl<F: PlatformFactory> LaunchWorker<F> {
    pub fn new(
        db: Arc<DatabaseGateway>,
        queue: Arc<PipelineQueue>,
        factory: Arc<F>,
        clock: Arc<dyn Clock>,
        pinned_commit: Option<String>,
    ) -> Self {
        Self {
            db,
            queue,
            factory,
            clock,
            pinned_commit,
        }
    }

    /// Build a runner, transition the DB row to READY, record `run_start`,
    /// add the runner to the queue, and spawn its execution body. All
    /// within the caller's transaction; the caller commits on success.
    #[instrument(skip(self, tx, row, analysis_type))]
    async fn launch_one(
        &self,
        tx: &mut PgConnection,
        row: &PipelineRow,
        analysis_type: &AnalysisTypeRow,
        req_cpus: u32,
    ) -> Result<(), DaemonError> {
        let blobs = self.db.config_blobs(tx, row).await?;
        let driver = Arc::new(self.factory.build(&row.name).await?);

        let demand = ResourceDemand {
            cpus: req_cpus,
            mem: resource_u32(analysis_type.mem),
            disk: resource_u32(analysis_type.disk_space),
            max_run_time_hours: analysis_type.max_run_time_hours,
        };

        let config = LaunchConfig {
            graph: blobs.graph,
            resource_kit: blobs.resource_kit,
            platform: blobs.platform,
            sample_sheet: blobs.sample_sheet,
            startup_script: blobs.startup_script,
        };

        let runner = PipelineRunner::new(
            row.id(),
            row.name.clone(),
            driver,
            demand,
            self.pinned_commit.clone(),
            config,
            PathBuf::from(&row.final_output_dir),
            Arc::clone(&self.clock),
        );

        self.db.update_status(tx, row.id(), Status::Ready).await?;
        self.db.set_run_start(tx, row.id(), self.clock.now()).await?;

        self.queue.add(Arc::clone(&runner) as Arc<dyn RunnerHandle>)?;
        runner.spawn()?;

        info!(id = %row.id(), cpus = req_cpus, "pipeline launched");
        Ok(())
    }
}

#[async_trait]
impl<F: PlatformFactory> WorkerTask for LaunchWorker<F> {
    fn name(&self) -> &'static str {
        "launch"
    }

    async fn tick(&self, stop: &AtomicBool) -> Result<(), DaemonError> {
        let idle = {
            let mut tx = self.db.begin().await?;
            self.db.idle_pipelines(&mut tx).await?
        };

        for row in idle {
            if stop.load(Ordering::SeqCst) {
                break;
            }

            let id = row.id();
            if self.queue.contains(id) {
                continue;
            }

            let mut tx = self.db.begin().await?;
            let analysis_type = self.db.analysis_type(&mut tx, row.analysis_type_id).await?;
            let req_cpus = u32::try_from(analysis_type.cpus).unwrap_or(0);

            if !self.queue.can_admit(req_cpus) {
                continue;
            }

            if let Err(e) = self.launch_one(&mut tx, &row, &analysis_type, req_cpus).await {
                warn!(id = %id, error = %e, "launch worker failed to start pipeline");
                self.db.update_status(&mut tx, id, Status::Failed).await?;
                self.db
                    .update_error_type(&mut tx, id, ErrorType::Init, &e.to_string())
                    .await?;
                tx.commit().await?;
                return Err(e);
            }

            tx.commit().await?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
