// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from the Database Gateway.

use thiserror::Error;

/// Errors surfaced by `cc-db`, grounded on `DBHelper.py`'s `DBError`
/// taxonomy: connection/session failures, plus the two ambiguous-lookup
/// cases the original distinguishes with `NoResultFound`/`MultipleResultsFound`.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("no pipeline found with id: {0}")]
    NotFound(i64),

    #[error("multiple rows found for a query expecting exactly one: {0}")]
    MultipleRows(String),

    #[error("status '{0}' is not defined in the database")]
    UnknownStatus(String),

    #[error("error type '{0}' is not defined in the database")]
    UnknownErrorType(String),

    #[error("invalid config type requested: {0}")]
    InvalidConfigType(String),

    #[error("base64 decode failed for {field}: {source}")]
    Base64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
}
