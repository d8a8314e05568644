// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon Manager: the composition root. Owns startup validation, worker
//! lifecycle, live config reload, and the shutdown sequence. Grounded on
//! `original_source/CCDaemon/DaemonManager.py`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cc_adapters::{EmailNotifier, PlatformFactory, ReportSource};
use cc_core::{Clock, PipelineQueue};
use cc_db::DatabaseGateway;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::DaemonError;
use crate::reconcile::reconcile_orphans;
use crate::workers::{self, WorkerHandle};

/// How often `clean_up` polls the Run Worker while waiting for the queue
/// to drain, matching the original's `time.sleep(5)`.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

struct Handles {
    launch: WorkerHandle,
    run: WorkerHandle,
    report: WorkerHandle,
}

pub struct DaemonManager<F: PlatformFactory, S: ReportSource, E: EmailNotifier> {
    db: Arc<DatabaseGateway>,
    queue: Arc<PipelineQueue>,
    factory: Arc<F>,
    report_platform: Arc<F::Driver>,
    report_source: Arc<S>,
    email: Arc<E>,
    clock: Arc<dyn Clock>,
    config_path: PathBuf,
    pinned_commit: Option<String>,
    worker_sleep: Duration,
    daemon_sleep: Duration,
    handles: Mutex<Option<Handles>>,
    summoned: AtomicBool,
    stopped: AtomicBool,
}

impl<F: PlatformFactory, S: ReportSource, E: EmailNotifier> DaemonManager<F, S, E> {
    /// Build every component from a validated [`Config`]. Building the
    /// Report Worker's dedicated platform driver happens here (once, named
    /// `"ReportPlatform"` as in the original) rather than in `summon`, so a
    /// factory failure surfaces before `validate()` is even called.
    pub async fn new(
        config: &Config,
        config_path: PathBuf,
        db: Arc<DatabaseGateway>,
        factory: Arc<F>,
        report_source: Arc<S>,
        email: Arc<E>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DaemonError> {
        let queue = Arc::new(PipelineQueue::new(
            config.pipeline_queue.max_cpus,
            config.pipeline_queue.max_loading,
        ));
        let report_platform = Arc::new(factory.build("ReportPlatform").await?);

        Ok(Self {
            db,
            queue,
            factory,
            report_platform,
            report_source,
            email,
            clock,
            config_path,
            pinned_commit: config.platform.pinned_commit.clone(),
            worker_sleep: config.worker_sleep_duration(),
            daemon_sleep: config.daemon_sleep_duration(),
            handles: Mutex::new(None),
            summoned: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        })
    }

    /// Validate every peripheral component that supports validation: the
    /// Report Source subscription/topic, the Email Notifier's SMTP
    /// credentials. The Platform Factory itself has no `is_valid` analog in
    /// this crate's trait — successfully constructing the Report Worker's
    /// driver in [`Self::new`] already exercises it.
    pub async fn validate(&self) -> Result<(), DaemonError> {
        info!("validating report source");
        if !self.report_source.subscription_exists().await? {
            return Err(DaemonError::Validation(
                "report source subscription does not exist".to_string(),
            ));
        }
        if !self.report_source.topic_exists().await? {
            return Err(DaemonError::Validation(
                "report source topic does not exist".to_string(),
            ));
        }

        info!("validating email notifier");
        self.email.validate().await?;

        info!("CC-Daemon is valid");
        Ok(())
    }

    /// Reconcile orphaned pipelines, then start the three workers.
    pub async fn summon(&self) -> Result<(), DaemonError> {
        info!("summoning CC-Daemon");

        let orphaned = reconcile_orphans(&self.db).await?;
        info!(orphaned, "startup reconciliation complete");

        let launch = workers::launch::LaunchWorker::new(
            Arc::clone(&self.db),
            Arc::clone(&self.queue),
            Arc::clone(&self.factory),
            Arc::clone(&self.clock),
            self.pinned_commit.clone(),
        );
        let run = workers::run::RunWorker::new(
            Arc::clone(&self.db),
            Arc::clone(&self.queue),
            Arc::clone(&self.clock),
        );
        let report = workers::report::ReportWorker::new(
            Arc::clone(&self.db),
            Arc::clone(&self.queue),
            Arc::clone(&self.report_source),
            Arc::clone(&self.report_platform),
        );

        *self.handles.lock() = Some(Handles {
            launch: workers::spawn(Arc::new(launch), self.worker_sleep),
            run: workers::spawn(Arc::new(run), self.worker_sleep),
            report: workers::spawn(Arc::new(report), self.worker_sleep),
        });
        self.summoned.store(true, Ordering::SeqCst);

        info!("CC-Daemon is afoot. Tread lightly brave warrior.");
        Ok(())
    }

    /// The supervisory loop: dump queue state, re-raise any worker
    /// failure, sleep, repeat. Returns on a worker failure or once
    /// [`Self::stop`] has been called.
    pub async fn run_until_stopped(&self) -> Result<(), DaemonError> {
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                return Ok(());
            }

            info!("\n\n{}\n", self.queue.dump(self.clock.as_ref()));
            self.check_workers()?;

            tokio::time::sleep(self.daemon_sleep).await;
        }
    }

    fn check_workers(&self) -> Result<(), DaemonError> {
        let guard = self.handles.lock();
        if let Some(handles) = guard.as_ref() {
            handles.launch.check()?;
            handles.run.check()?;
            handles.report.check()?;
        }
        Ok(())
    }

    /// Signal the supervisory loop to exit.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Re-read the config file and apply `max_cpus`/`max_loading` changes
    /// to the live queue. Failures are logged and swallowed, matching the
    /// original's `update_pipeline_queue` catch-and-log behavior.
    pub fn reload_queue_limits(&self) {
        let config = match Config::load(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "unable to refresh pipeline queue from config file");
                return;
            }
        };

        let max_cpus = config.pipeline_queue.max_cpus;
        if max_cpus != self.queue.max_cpus() {
            info!(from = self.queue.max_cpus(), to = max_cpus, "updating pipeline queue cpu limit");
            self.queue.set_max_cpus(max_cpus);
        }

        let max_loading = config.pipeline_queue.max_loading;
        if max_loading != self.queue.max_loading() {
            info!(from = self.queue.max_loading(), to = max_loading, "updating pipeline queue loading limit");
            self.queue.set_max_loading(max_loading);
        }
    }

    /// Stop new launches, cancel every in-flight runner, and wait for the
    /// Run Worker to drain the queue. If it can't (the Run Worker died),
    /// finalize the stragglers directly before stopping the remaining
    /// workers.
    pub async fn clean_up(&self) {
        let handles = self.handles.lock().take();
        let Some(handles) = handles else {
            return;
        };

        info!("stopping new jobs from launching");
        handles.launch.stop();

        info!("canceling all currently running jobs");
        for runner in self.queue.snapshot_all() {
            runner.cancel().await;
        }

        info!("waiting while the run worker tries to clear the pipeline queue");
        while !handles.run.is_stopped() && !self.queue.is_empty() {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }

        if self.queue.is_empty() {
            info!("successfully cleared all pipelines from the pipeline queue");
        } else {
            warn!("run worker unable to clear all pipelines from the pipeline queue");
            for runner in self.queue.snapshot_all() {
                info!(id = %runner.id(), "trying one last time to destroy pipeline");
                runner.force_finalize().await;
            }
        }

        handles.report.stop();
        handles.run.stop();
        handles.launch.join().await;
        handles.run.join().await;
        handles.report.join().await;
    }

    /// Stop the loop, clean up if summoned, and email recipients about the
    /// failure. Mirrors the original's `finalize(err_msg)`.
    pub async fn shutdown(&self, err_msg: Option<&str>) {
        self.stop();

        if self.summoned.load(Ordering::SeqCst) {
            info!("cleaning up CC-Daemon pipelines");
            self.clean_up().await;
        }

        self.report_failure(err_msg).await;
    }

    async fn report_failure(&self, err_msg: Option<&str>) {
        info!("notifying administrators of CC-Daemon failure");
        if let Err(e) = self.email.send_failure_email(&failure_body(err_msg)).await {
            warn!(error = %e, "failed to send failure notification email");
        }
    }
}

/// The failure email body, matching the original's `"CC-Daemon has failed!"`
/// plus an optional appended message.
fn failure_body(err_msg: Option<&str>) -> String {
    let mut body = "CC-Daemon has failed!".to_string();
    if let Some(msg) = err_msg {
        body.push('\n');
        body.push_str(msg);
    }
    body
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
