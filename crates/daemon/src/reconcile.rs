// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup orphan reconciliation: any DB pipeline left in a non-terminal,
//! non-IDLE status has no live runner behind it (the daemon that owned it
//! crashed or was killed). Grounded on `DaemonManager.py`'s
//! `__update_outdated_runs`.

use std::sync::Arc;

use cc_core::{ErrorType, Status};
use cc_db::DatabaseGateway;
use tracing::{info, warn};

use crate::error::DaemonError;

const ORPHAN_NOTE: &str = "orphaned pipeline updated upon daemon start";

/// Every pipeline whose status is not in {IDLE, FAILED, SUCCESS} is marked
/// FAILED/OTHER with [`ORPHAN_NOTE`]. Runs once, in its own transaction per
/// pipeline, before any worker starts.
pub async fn reconcile_orphans(db: &DatabaseGateway) -> Result<usize, DaemonError> {
    let rows = {
        let mut tx = db.begin().await?;
        db.non_terminal_non_idle_pipelines(&mut tx).await?
    };

    let mut count = 0;
    for row in rows {
        let id = row.id();
        warn!(id = %id, "reconciling orphaned pipeline at startup");

        let mut tx = db.begin().await?;
        db.update_status(&mut tx, id, Status::Failed).await?;
        db.update_error_type(&mut tx, id, ErrorType::Other, ORPHAN_NOTE)
            .await?;
        tx.commit().await?;
        count += 1;
    }

    info!(count, "orphan reconciliation complete");
    Ok(count)
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
