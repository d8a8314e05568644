// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report Worker: drains the report bus and writes completion outcomes to
//! the database, including the optional QC-stat ingestion extension.
//! Grounded on `original_source/CCDaemon/Workers/ReportWorker.py` and
//! `original_source/CCDaemon/Pipeline/QCReport.py`'s JSON schema.

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use cc_adapters::{parse_report, PlatformDriver, ReportSource};
use cc_core::{ErrorType, PipelineQueue, Report, Status};
use cc_db::{DbError, QcStatRow};
use sqlx::PgConnection;
use tracing::{info, instrument, warn};

use super::WorkerTask;
use crate::error::DaemonError;

/// One entry of a `{sample: [entry, ...]}` QC report, matching
/// `QCReport.py`'s per-sample stat shape.
#[derive(Debug, serde::Deserialize)]
struct QcEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "Module")]
    module: String,
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Note")]
    note: String,
}

/// Parse a QC report body into rows, deduplicating within the document by
/// `(sample, metric, task, source_file)`. The metric name folds in the QC
/// module so stats from different modules with the same `Name` don't
/// collide (e.g. two tools both reporting a "GC Content" metric).
fn parse_qc_report(
    body: &[u8],
    task_id: &str,
    source_file: &str,
) -> Result<Vec<QcStatRow>, serde_json::Error> {
    let parsed: std::collections::HashMap<String, Vec<QcEntry>> = serde_json::from_slice(body)?;
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for (sample, entries) in parsed {
        for entry in entries {
            let metric = if entry.module.is_empty() {
                entry.name
            } else {
                format!("{}.{}", entry.module, entry.name)
            };
            let notes = if entry.source.is_empty() {
                entry.note
            } else {
                format!("{} (source={})", entry.note, entry.source)
            };
            let row = QcStatRow {
                sample: sample.clone(),
                metric,
                value: entry.value,
                task_id: task_id.to_string(),
                source_file: source_file.to_string(),
                notes,
            };
            if seen.insert(row.dedup_key()) {
                rows.push(row);
            }
        }
    }

    Ok(rows)
}

pub struct ReportWorker<S: ReportSource, P: PlatformDriver> {
    db: Arc<cc_db::DatabaseGateway>,
    queue: Arc<PipelineQueue>,
    source: Arc<S>,
    /// A platform driver dedicated to the Report Worker (built once via the
    /// factory, distinct from any per-job driver), used only for
    /// `path_exists`/`cat_file` checks against already-finalized jobs.
    platform: Arc<P>,
}

impl<S: ReportSource, P: PlatformDriver> ReportWorker<S, P> {
    pub fn new(
        db: Arc<cc_db::DatabaseGateway>,
        queue: Arc<PipelineQueue>,
        source: Arc<S>,
        platform: Arc<P>,
    ) -> Self {
        Self {
            db,
            queue,
            source,
            platform,
        }
    }

    /// `file_type == "qc_report"` entries among the found output files are
    /// fetched, parsed, deduplicated, and inserted. A malformed or
    /// unreadable QC report is logged and skipped — it does not fail the
    /// rest of report processing.
    async fn ingest_qc_stats(&self, tx: &mut PgConnection, report: &Report) {
        let mut seen = HashSet::new();
        for file in report
            .files
            .iter()
            .filter(|f| f.found && f.file_type == "qc_report")
        {
            let bytes = match self.platform.cat_file(&file.path).await {
                Ok(b) => b,
                Err(e) => {
                    warn!(path = %file.path, error = %e, "failed to fetch qc report, skipping");
                    continue;
                }
            };

            let rows = match parse_qc_report(&bytes, &file.task_id, &file.path) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(path = %file.path, error = %e, "malformed qc report, skipping");
                    continue;
                }
            };

            for row in rows {
                if !seen.insert(row.dedup_key()) {
                    continue;
                }
                if let Err(e) = self.db.register_qc_stat(tx, report.pipeline_id, &row).await {
                    warn!(path = %file.path, error = %e, "failed to insert qc stat row");
                }
            }
        }
    }

    #[instrument(skip(self, report))]
    async fn apply(&self, mut report: Report) -> Result<(), DaemonError> {
        let mut tx = self.db.begin().await?;

        let row = match self.db.pipeline(&mut tx, report.pipeline_id).await {
            Ok(row) => row,
            Err(DbError::NotFound(_)) => {
                tx.commit().await?;
                self.source.ack(&report.report_id).await?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if row.cost.is_some() {
            tx.commit().await?;
            self.source.ack(&report.report_id).await?;
            return Ok(());
        }

        let mut missing_paths = Vec::new();
        for file in &mut report.files {
            file.found = self.platform.path_exists(&file.path).await?;
            if !file.found {
                missing_paths.push(file.path.clone());
            }
        }

        let mut success = report.success;
        let mut error_msg = report.error.clone().unwrap_or_default();
        if !missing_paths.is_empty() {
            success = false;
            let note = format!("declared output file(s) not found: {}", missing_paths.join(", "));
            error_msg = if error_msg.is_empty() {
                note
            } else {
                format!("{error_msg}\n{note}")
            };
        }

        self.db
            .set_cost_and_commit(
                &mut tx,
                report.pipeline_id,
                report.total_cost.unwrap_or(0.0),
                report.git_commit.as_deref(),
            )
            .await?;

        for file in report.files.iter().filter(|f| f.found) {
            self.db
                .register_output_file(&mut tx, report.pipeline_id, &file.task_id, &file.file_type, &file.path)
                .await?;
        }

        if success {
            self.db.update_status(&mut tx, report.pipeline_id, Status::Success).await?;
            self.db
                .update_error_type(&mut tx, report.pipeline_id, ErrorType::None, "")
                .await?;
        } else {
            let current = self.db.current_error_type(&mut tx, report.pipeline_id).await?;
            let overwrite = matches!(current, None | Some(ErrorType::Report) | Some(ErrorType::Run));
            if overwrite {
                self.db.update_status(&mut tx, report.pipeline_id, Status::Failed).await?;
                self.db
                    .update_error_type(&mut tx, report.pipeline_id, ErrorType::Run, &error_msg)
                    .await?;
            }
        }

        self.ingest_qc_stats(&mut tx, &report).await;

        tx.commit().await?;
        self.source.ack(&report.report_id).await?;
        info!(id = %report.pipeline_id, success, "report processed");
        Ok(())
    }
}

#[async_trait]
impl<S: ReportSource, P: PlatformDriver> WorkerTask for ReportWorker<S, P> {
    fn name(&self) -> &'static str {
        "report"
    }

    async fn tick(&self, _stop: &AtomicBool) -> Result<(), DaemonError> {
        let incoming = match self.source.pull().await? {
            Some(r) => r,
            None => return Ok(()),
        };

        let report = match parse_report(incoming.ack_id.clone(), &incoming.body) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "malformed report, discarding");
                self.source.ack(&incoming.ack_id).await?;
                return Ok(());
            }
        };

        if self.queue.contains(report.pipeline_id) {
            // The Run Worker hasn't retired this runner yet; defer without
            // acking so the bus redelivers it.
            return Ok(());
        }

        self.apply(report).await
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
