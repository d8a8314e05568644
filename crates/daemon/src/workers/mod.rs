// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic-loop scaffolding shared by the Launch, Run, and Report
//! workers. Grounded on `original_source/CCDaemon/Workers/StatusWorker.py`'s
//! base class: a per-tick task, a sleep, a stop flag checked before each
//! iteration, and a captured exception re-raised by a supervisory `check()`
//! call — resolved here with a single `AtomicBool` rather than the
//! original's respawned-per-call `threading.Lock()` (spec.md §9).

pub mod launch;
pub mod report;
pub mod run;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::error::DaemonError;

/// One tick of a periodic worker loop.
#[async_trait]
pub trait WorkerTask: Send + Sync + 'static {
    /// Name used in logs and in [`DaemonError::WorkerFailed`].
    fn name(&self) -> &'static str;

    /// `stop` is the same flag [`WorkerHandle::stop`] sets; a tick that
    /// iterates a list of items should check it between items and exit
    /// early, so a stop requested mid-tick takes effect immediately
    /// instead of after the whole list is drained.
    async fn tick(&self, stop: &AtomicBool) -> Result<(), DaemonError>;
}

/// A spawned worker: its stop flag, join handle, and any captured failure.
pub struct WorkerHandle {
    name: &'static str,
    stop: Arc<AtomicBool>,
    join: Mutex<Option<JoinHandle<()>>>,
    failure: Arc<Mutex<Option<DaemonError>>>,
}

impl WorkerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signal the loop to exit before its next tick. Does not interrupt a
    /// tick already in flight.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Re-raise a captured tick failure, if any. A worker that stopped
    /// cleanly (via [`Self::stop`]) has nothing to report.
    pub fn check(&self) -> Result<(), DaemonError> {
        if let Some(source) = self.failure.lock().take() {
            return Err(DaemonError::WorkerFailed {
                worker: self.name,
                source: Box::new(source),
            });
        }
        Ok(())
    }

    /// Wait for the loop task to exit. No-op if already joined.
    pub async fn join(&self) {
        let handle = self.join.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

/// Spawn `task`'s loop: tick, sleep, repeat, until stopped or a tick fails.
/// A failed tick stops the loop; the error is captured for [`WorkerHandle::check`]
/// rather than propagated from the spawned task itself.
pub fn spawn<T: WorkerTask>(task: Arc<T>, sleep: Duration) -> WorkerHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let failure: Arc<Mutex<Option<DaemonError>>> = Arc::new(Mutex::new(None));
    let name = task.name();

    let loop_stop = Arc::clone(&stop);
    let loop_failure = Arc::clone(&failure);
    let join = tokio::spawn(async move {
        loop {
            if loop_stop.load(Ordering::SeqCst) {
                break;
            }
            if let Err(e) = task.tick(&loop_stop).await {
                tracing::error!(worker = name, error = %e, "worker tick failed");
                *loop_failure.lock() = Some(e);
                break;
            }
            tokio::time::sleep(sleep).await;
        }
    });

    WorkerHandle {
        name,
        stop,
        join: Mutex::new(Some(join)),
        failure,
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
