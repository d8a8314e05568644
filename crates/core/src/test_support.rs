// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only fakes shared across crates (`cc-engine`, `cc-daemon` tests
//! build queues against these instead of a real `PipelineRunner`).
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::clock::SystemClock;
use crate::error_type::ErrorType;
use crate::ids::AnalysisId;
use crate::runner_handle::{ResourceDemand, RunnerHandle};
use crate::status::Status;
use crate::Clock;

/// Minimal in-memory stand-in for `cc_engine::PipelineRunner`, for testing
/// `PipelineQueue` admission/totals logic without spinning up a real
/// platform driver.
pub struct FakeRunnerHandle {
    id: AnalysisId,
    name: String,
    demand: ResourceDemand,
    status: Mutex<Status>,
    err: Mutex<(ErrorType, String)>,
    start_time: Mutex<Option<DateTime<Utc>>>,
    end_time: Mutex<Option<DateTime<Utc>>>,
}

impl FakeRunnerHandle {
    pub fn new(id: AnalysisId, name: &str, cpus: u32, status: Status) -> Self {
        Self {
            id,
            name: name.to_string(),
            demand: ResourceDemand {
                cpus,
                mem: None,
                disk: None,
                max_run_time_hours: 24.0,
            },
            status: Mutex::new(status),
            err: Mutex::new((ErrorType::None, String::new())),
            start_time: Mutex::new(Some(SystemClock.now())),
            end_time: Mutex::new(None),
        }
    }

    pub fn with_max_run_time(mut self, hours: f64) -> Self {
        self.demand.max_run_time_hours = hours;
        self
    }

    pub fn with_start_time(self, at: DateTime<Utc>) -> Self {
        *self.start_time.lock() = Some(at);
        self
    }

    pub fn set_status(&self, status: Status) {
        *self.status.lock() = status;
    }

    pub fn mark_finished(&self, err_type: ErrorType, err_msg: impl Into<String>) {
        *self.status.lock() = Status::Finished;
        *self.err.lock() = (err_type, err_msg.into());
        *self.end_time.lock() = Some(SystemClock.now());
    }
}

#[async_trait]
impl RunnerHandle for FakeRunnerHandle {
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
        *self.status.lock()
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

    async fn cancel(&self) {
        let mut status = self.status.lock();
        if matches!(*status, Status::Destroying | Status::Finished | Status::Cancelling) {
            return;
        }
        *status = Status::Cancelling;
        *self.err.lock() = (ErrorType::Cancel, "cancelled".to_string());
    }

    async fn force_finalize(&self) {
        let mut status = self.status.lock();
        if !matches!(*status, Status::Destroying | Status::Finished) {
            *status = Status::Finished;
            *self.end_time.lock() = Some(SystemClock.now());
        }
    }
}
