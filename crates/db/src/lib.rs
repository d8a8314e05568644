// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Database Gateway: the daemon's only path to Postgres.
//!
//! Every other crate talks to the `Analysis`/`AnalysisType`/`AnalysisOutput`
//! tables exclusively through [`DatabaseGateway`] and its session-scoped
//! transactions; nothing outside `cc-db` holds a `PgPool` or writes SQL.

mod error;
mod gateway;
mod models;
mod status_cache;

pub use error::DbError;
pub use gateway::DatabaseGateway;
pub use models::{AnalysisTypeRow, ConfigBlobs, NamedRow, PipelineRow, QcStatRow};
pub use status_cache::StatusCache;
