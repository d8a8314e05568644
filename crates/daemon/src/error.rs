// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level daemon error, aggregating every lower crate's error via
//! `#[from]`, mirroring the aggregate-error shape of the daemon's original
//! `lifecycle.rs` `LifecycleError`.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Db(#[from] cc_db::DbError),

    #[error(transparent)]
    Platform(#[from] cc_adapters::PlatformError),

    #[error(transparent)]
    Email(#[from] cc_adapters::EmailError),

    #[error(transparent)]
    ReportSource(#[from] cc_adapters::ReportSourceError),

    #[error(transparent)]
    Queue(#[from] cc_core::QueueError),

    #[error(transparent)]
    Engine(#[from] cc_engine::EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{worker} worker failed: {source}")]
    WorkerFailed {
        worker: &'static str,
        #[source]
        source: Box<DaemonError>,
    },

    #[error("startup validation failed: {0}")]
    Validation(String),
}
