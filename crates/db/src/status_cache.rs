// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup synchronization of the `AnalysisStatus`/`AnalysisError` tables:
//! for each known `Status`/`ErrorType` variant, insert a row if absent and
//! cache its id, mirroring `DBHelper.py`'s `sync_statuses`/`sync_error_types`.

use std::collections::HashMap;

use cc_core::{ErrorType, Status};
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::NamedRow;

/// Caches of DB-assigned ids for each closed-enum variant, populated once
/// at startup and read (never mutated) for the remainder of the process.
#[derive(Debug, Clone, Default)]
pub struct StatusCache {
    statuses: HashMap<&'static str, i64>,
    error_types: HashMap<&'static str, i64>,
}

impl StatusCache {
    pub fn status_id(&self, status: Status) -> Result<i64, DbError> {
        self.statuses
            .get(status.as_db_str())
            .copied()
            .ok_or_else(|| DbError::UnknownStatus(status.as_db_str().to_string()))
    }

    pub fn error_type_id(&self, error_type: ErrorType) -> Result<i64, DbError> {
        self.error_types
            .get(error_type.as_db_str())
            .copied()
            .ok_or_else(|| DbError::UnknownErrorType(error_type.as_db_str().to_string()))
    }

    /// Insert-if-absent every `Status`/`ErrorType` variant, then cache ids.
    /// Run once at gateway construction, inside its own transaction.
    pub async fn sync(pool: &PgPool) -> Result<Self, DbError> {
        let mut cache = StatusCache::default();
        let mut tx = pool.begin().await?;

        for status in Status::ALL {
            let name = status.as_db_str();
            sqlx::query(
                "INSERT INTO analysis_status (description) VALUES ($1) \
                 ON CONFLICT (description) DO NOTHING",
            )
            .bind(name)
            .execute(&mut *tx)
            .await?;

            let row: NamedRow = sqlx::query_as(
                "SELECT status_id AS id FROM analysis_status WHERE description = $1",
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
            cache.statuses.insert(name, row.id);
        }

        for error_type in ErrorType::ALL {
            let name = error_type.as_db_str();
            sqlx::query(
                "INSERT INTO analysis_error (error_type, description) VALUES ($1, $2) \
                 ON CONFLICT (error_type) DO NOTHING",
            )
            .bind(name)
            .bind(error_type.canned_message())
            .execute(&mut *tx)
            .await?;

            let row: NamedRow = sqlx::query_as(
                "SELECT error_id AS id FROM analysis_error WHERE error_type = $1",
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
            cache.error_types.insert(name, row.id);
        }

        tx.commit().await?;
        Ok(cache)
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn from_maps(
        statuses: HashMap<&'static str, i64>,
        error_types: HashMap<&'static str, i64>,
    ) -> Self {
        Self {
            statuses,
            error_types,
        }
    }
}

#[cfg(test)]
#[path = "status_cache_tests.rs"]
mod tests;
