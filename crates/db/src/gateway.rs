// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional access to pipeline records, grounded on `DBHelper.py`.
//!
//! Every worker tick opens one session (a `sqlx::Transaction`) via
//! [`DatabaseGateway::begin`], does its reads/writes against it, and either
//! commits or lets the transaction drop (rolling back), mirroring the
//! `session_context` contextmanager's commit-or-rollback discipline.

use chrono::{DateTime, Utc};
use cc_core::{AnalysisId, ErrorType, Status};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::instrument;

use crate::error::DbError;
use crate::models::{AnalysisTypeRow, ConfigBlobs, PipelineRow, QcStatRow};
use crate::status_cache::StatusCache;

/// Session-scoped transactional gateway over the `Analysis`* tables.
pub struct DatabaseGateway {
    pool: PgPool,
    cache: StatusCache,
}

impl DatabaseGateway {
    /// Connect and synchronize the status/error-type caches (they must be
    /// synchronized at startup).
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPool::connect(database_url).await?;
        Self::new(pool).await
    }

    pub async fn new(pool: PgPool) -> Result<Self, DbError> {
        let cache = StatusCache::sync(&pool).await?;
        Ok(Self { pool, cache })
    }

    /// Open a new unit-of-work. Callers commit explicitly; dropping the
    /// transaction without committing rolls it back.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        Ok(self.pool.begin().await?)
    }

    /// All pipelines with status IDLE.
    #[instrument(skip(self, tx))]
    pub async fn idle_pipelines(&self, tx: &mut PgConnection) -> Result<Vec<PipelineRow>, DbError> {
        let status_id = self.cache.status_id(Status::Idle)?;
        let rows = sqlx::query_as::<_, PipelineRow>(
            "SELECT analysis_id, name, analysis_type_id, status_id, error_id, cost, \
                    git_commit, final_output_dir \
             FROM analysis WHERE status_id = $1",
        )
        .bind(status_id)
        .fetch_all(tx)
        .await?;
        Ok(rows)
    }

    /// All pipelines, regardless of status.
    pub async fn all_pipelines(&self, tx: &mut PgConnection) -> Result<Vec<PipelineRow>, DbError> {
        let rows = sqlx::query_as::<_, PipelineRow>(
            "SELECT analysis_id, name, analysis_type_id, status_id, error_id, cost, \
                    git_commit, final_output_dir \
             FROM analysis",
        )
        .fetch_all(tx)
        .await?;
        Ok(rows)
    }

    /// Every pipeline whose status is neither IDLE nor terminal — no live
    /// runner exists for these at startup, so reconciliation must flip
    /// them to FAILED/OTHER.
    #[instrument(skip(self, tx))]
    pub async fn non_terminal_non_idle_pipelines(
        &self,
        tx: &mut PgConnection,
    ) -> Result<Vec<PipelineRow>, DbError> {
        let rows = sqlx::query_as::<_, PipelineRow>(
            "SELECT a.analysis_id, a.name, a.analysis_type_id, a.status_id, a.error_id, \
                    a.cost, a.git_commit, a.final_output_dir \
             FROM analysis a JOIN analysis_status s ON a.status_id = s.status_id \
             WHERE s.description NOT IN ('idle', 'success', 'failed')",
        )
        .fetch_all(tx)
        .await?;
        Ok(rows)
    }

    /// Fetch one pipeline's row by id.
    #[instrument(skip(self, tx))]
    pub async fn pipeline(&self, tx: &mut PgConnection, id: AnalysisId) -> Result<PipelineRow, DbError> {
        sqlx::query_as::<_, PipelineRow>(
            "SELECT analysis_id, name, analysis_type_id, status_id, error_id, cost, \
                    git_commit, final_output_dir \
             FROM analysis WHERE analysis_id = $1",
        )
        .bind(id.get())
        .fetch_optional(tx)
        .await?
        .ok_or(DbError::NotFound(id.get()))
    }

    pub async fn pipeline_exists(&self, tx: &mut PgConnection, id: AnalysisId) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM analysis WHERE analysis_id = $1")
            .bind(id.get())
            .fetch_one(tx)
            .await?;
        Ok(count > 0)
    }

    /// The immutable resource-demand declaration for a pipeline's analysis_type.
    pub async fn analysis_type(
        &self,
        tx: &mut PgConnection,
        analysis_type_id: i64,
    ) -> Result<AnalysisTypeRow, DbError> {
        sqlx::query_as::<_, AnalysisTypeRow>(
            "SELECT cpus, mem, disk_space, max_run_time_hours \
             FROM analysis_type WHERE analysis_type_id = $1",
        )
        .bind(analysis_type_id)
        .fetch_one(tx)
        .await
        .map_err(DbError::from)
    }

    /// The four mandatory config blobs plus optional startup script,
    /// base64-decoded.
    pub async fn config_blobs(
        &self,
        tx: &mut PgConnection,
        pipeline: &PipelineRow,
    ) -> Result<ConfigBlobs, DbError> {
        #[derive(sqlx::FromRow)]
        struct Blobs {
            graph_config: String,
            resource_kit_config: String,
            platform_config: String,
            startup_script: Option<String>,
            sample_sheet: String,
        }

        let blobs: Blobs = sqlx::query_as(
            "SELECT at.graph_config, at.resource_kit_config, at.platform_config, \
                    at.startup_script, a.sample_sheet \
             FROM analysis a JOIN analysis_type at ON a.analysis_type_id = at.analysis_type_id \
             WHERE a.analysis_id = $1",
        )
        .bind(pipeline.analysis_id)
        .fetch_one(tx)
        .await?;

        ConfigBlobs::decode(
            &blobs.graph_config,
            &blobs.resource_kit_config,
            &blobs.platform_config,
            &blobs.sample_sheet,
            blobs.startup_script.as_deref(),
        )
    }

    /// Set the status column directly.
    #[instrument(skip(self, tx))]
    pub async fn update_status(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
        status: Status,
    ) -> Result<(), DbError> {
        let status_id = self.cache.status_id(status)?;
        sqlx::query("UPDATE analysis SET status_id = $1 WHERE analysis_id = $2")
            .bind(status_id)
            .bind(id.get())
            .execute(tx)
            .await?;
        Ok(())
    }

    /// Set the error_type + canned message, with an optional extra message
    /// appended on a new line (mirroring `update_error_type`'s
    /// `extra_error_msg` parameter).
    #[instrument(skip(self, tx, extra_msg))]
    pub async fn update_error_type(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
        error_type: ErrorType,
        extra_msg: &str,
    ) -> Result<(), DbError> {
        let error_id = self.cache.error_type_id(error_type)?;
        let mut msg = error_type.canned_message().to_string();
        if !extra_msg.is_empty() {
            msg.push('\n');
            msg.push_str(extra_msg);
        }
        sqlx::query(
            "UPDATE analysis SET error_id = $1, error_msg = $2 WHERE analysis_id = $3",
        )
        .bind(error_id)
        .bind(msg)
        .bind(id.get())
        .execute(tx)
        .await?;
        Ok(())
    }

    /// The current error_type recorded for a pipeline, if any (used by the
    /// Report Worker's "leave untouched for a harder error" branch).
    pub async fn current_error_type(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
    ) -> Result<Option<ErrorType>, DbError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT error_type FROM analysis a JOIN analysis_error e ON a.error_id = e.error_id WHERE a.analysis_id = $1")
                .bind(id.get())
                .fetch_optional(tx)
                .await?;
        Ok(row.and_then(|(s,)| s).and_then(|s| ErrorType::from_db_str(&s)))
    }

    /// The current status recorded for a pipeline, used by the Run Worker
    /// to detect an operator-issued cancel and to avoid redundant writes.
    pub async fn current_status(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
    ) -> Result<Status, DbError> {
        let row: (String,) = sqlx::query_as(
            "SELECT s.description FROM analysis a \
             JOIN analysis_status s ON a.status_id = s.status_id \
             WHERE a.analysis_id = $1",
        )
        .bind(id.get())
        .fetch_one(tx)
        .await?;
        Status::from_db_str(&row.0).ok_or(DbError::UnknownStatus(row.0))
    }

    pub async fn set_run_start(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
        at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE analysis SET run_start = $1 WHERE analysis_id = $2")
            .bind(at)
            .bind(id.get())
            .execute(tx)
            .await?;
        Ok(())
    }

    pub async fn set_run_time_hours(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
        hours: f64,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE analysis SET run_time_hours = $1 WHERE analysis_id = $2")
            .bind(hours)
            .bind(id.get())
            .execute(tx)
            .await?;
        Ok(())
    }

    /// Set cost and, if present, the source git commit.
    pub async fn set_cost_and_commit(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
        cost: f64,
        git_commit: Option<&str>,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE analysis SET cost = $1 WHERE analysis_id = $2")
            .bind(cost)
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        if let Some(commit) = git_commit {
            sqlx::query("UPDATE analysis SET git_commit = $1 WHERE analysis_id = $2")
                .bind(commit)
                .bind(id.get())
                .execute(tx)
                .await?;
        }
        Ok(())
    }

    /// Insert one `AnalysisOutput` row.
    pub async fn register_output_file(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
        task_id: &str,
        output_key: &str,
        path: &str,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO analysis_output (analysis_id, node_id, output_key, path) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id.get())
        .bind(task_id)
        .bind(output_key)
        .bind(path)
        .execute(tx)
        .await?;
        Ok(())
    }

    /// Insert one `AnalysisQCStat` row (the optional QC-ingestion extension).
    pub async fn register_qc_stat(
        &self,
        tx: &mut PgConnection,
        id: AnalysisId,
        stat: &QcStatRow,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO analysis_qc_stat \
                (analysis_id, sample, metric, value, task_id, source_file, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id.get())
        .bind(&stat.sample)
        .bind(&stat.metric)
        .bind(&stat.value)
        .bind(&stat.task_id)
        .bind(&stat.source_file)
        .bind(&stat.notes)
        .execute(tx)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
