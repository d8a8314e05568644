// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull-and-acknowledge interface over the at-least-once completion-report
//! bus, grounded on `CCDaemon/Pipeline/PipelineReport.py`'s JSON schema and
//! `ReportWorker.py`'s `task()` pull loop.

use async_trait::async_trait;
use cc_core::{AnalysisId, OutputFile, Report, ReportId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportSourceError {
    #[error("report bus pull failed: {0}")]
    PullFailed(String),
    #[error("report bus ack failed: {0}")]
    AckFailed(String),
    #[error("report subscription does not exist: {0}")]
    SubscriptionMissing(String),
    #[error("report topic does not exist: {0}")]
    TopicMissing(String),
    #[error("malformed report payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One raw message pulled off the bus: an ack handle paired with its JSON
/// body. The body may arrive zlib-compressed and base64-wrapped twice on
/// the wire; unwrapping that envelope is the bus implementation's job, not
/// this crate's — by the time `pull` returns, `body` is plain JSON bytes.
#[derive(Debug, Clone)]
pub struct IncomingReport {
    pub ack_id: ReportId,
    pub body: Vec<u8>,
}

/// One `files[]` entry from the report JSON.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ReportFile {
    pub file_type: String,
    pub path: String,
    pub is_final_output: bool,
    pub task_id: String,
}

#[derive(Debug, serde::Deserialize)]
struct ReportPayload {
    pipeline_id: i64,
    status: String,
    #[serde(default)]
    error: String,
    #[serde(default)]
    total_cost: Option<f64>,
    #[serde(default)]
    git_commit: Option<String>,
    #[serde(default)]
    files: Vec<ReportFile>,
}

/// Parse a report's JSON body into the in-memory [`Report`] shape the Report
/// Worker consumes. Only `files` entries with `is_final_output: true` are
/// ingested; everything else is dropped, matching
/// `PipelineReport.py`'s filter.
pub fn parse_report(ack_id: ReportId, body: &[u8]) -> Result<Report, ReportSourceError> {
    let payload: ReportPayload = serde_json::from_slice(body)?;
    let success = payload.status == "Complete";
    let files = payload
        .files
        .into_iter()
        .filter(|f| f.is_final_output)
        .map(|f| OutputFile {
            path: f.path,
            file_type: f.file_type,
            task_id: f.task_id,
            found: false,
        })
        .collect();

    Ok(Report {
        report_id: ack_id,
        pipeline_id: AnalysisId::new(payload.pipeline_id),
        success,
        error: if payload.error.is_empty() {
            None
        } else {
            Some(payload.error)
        },
        total_cost: payload.total_cost,
        git_commit: payload.git_commit,
        files,
    })
}

/// Pull-with-ack interface over the message bus.
#[async_trait]
pub trait ReportSource: Send + Sync + 'static {
    /// Pull a single message, if one is available. Blocks briefly; returns
    /// `None` on an empty queue rather than erroring.
    async fn pull(&self) -> Result<Option<IncomingReport>, ReportSourceError>;

    async fn ack(&self, ack_id: &ReportId) -> Result<(), ReportSourceError>;

    async fn subscription_exists(&self) -> Result<bool, ReportSourceError>;

    async fn topic_exists(&self) -> Result<bool, ReportSourceError>;
}

/// Report source that never has anything to pull. The real message-bus
/// integration (Pub/Sub or similar) is out of scope for this repository;
/// `ccd` is wired to this source pending a concrete one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReportSource;

impl NoOpReportSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportSource for NoOpReportSource {
    async fn pull(&self) -> Result<Option<IncomingReport>, ReportSourceError> {
        Ok(None)
    }

    async fn ack(&self, _ack_id: &ReportId) -> Result<(), ReportSourceError> {
        Ok(())
    }

    async fn subscription_exists(&self) -> Result<bool, ReportSourceError> {
        Ok(true)
    }

    async fn topic_exists(&self) -> Result<bool, ReportSourceError> {
        Ok(true)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    struct FakeState {
        pending: VecDeque<IncomingReport>,
        acked: Vec<ReportId>,
        subscription_exists: bool,
        topic_exists: bool,
        next_id: u64,
    }

    /// In-memory report bus fake: a FIFO of pending messages plus a record
    /// of every acked id, for the Report Worker's deferred-ack assertions.
    #[derive(Clone)]
    pub struct FakeReportSource {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeReportSource {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState {
                    pending: VecDeque::new(),
                    acked: Vec::new(),
                    subscription_exists: true,
                    topic_exists: true,
                    next_id: 0,
                })),
            }
        }
    }

    impl FakeReportSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Enqueue a raw JSON body, auto-assigning an ack id.
        pub fn push(&self, body: impl Into<Vec<u8>>) -> ReportId {
            let mut inner = self.inner.lock();
            inner.next_id += 1;
            let ack_id = ReportId::new(format!("fake-report-{}", inner.next_id));
            inner.pending.push_back(IncomingReport {
                ack_id: ack_id.clone(),
                body: body.into(),
            });
            ack_id
        }

        pub fn acked(&self) -> Vec<ReportId> {
            self.inner.lock().acked.clone()
        }

        pub fn set_subscription_exists(&self, exists: bool) {
            self.inner.lock().subscription_exists = exists;
        }

        pub fn set_topic_exists(&self, exists: bool) {
            self.inner.lock().topic_exists = exists;
        }

        pub fn pending_count(&self) -> usize {
            self.inner.lock().pending.len()
        }
    }

    #[async_trait]
    impl ReportSource for FakeReportSource {
        async fn pull(&self) -> Result<Option<IncomingReport>, ReportSourceError> {
            Ok(self.inner.lock().pending.pop_front())
        }

        async fn ack(&self, ack_id: &ReportId) -> Result<(), ReportSourceError> {
            self.inner.lock().acked.push(ack_id.clone());
            Ok(())
        }

        async fn subscription_exists(&self) -> Result<bool, ReportSourceError> {
            Ok(self.inner.lock().subscription_exists)
        }

        async fn topic_exists(&self) -> Result<bool, ReportSourceError> {
            Ok(self.inner.lock().topic_exists)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeReportSource;

#[cfg(test)]
#[path = "report_source_tests.rs"]
mod tests;
