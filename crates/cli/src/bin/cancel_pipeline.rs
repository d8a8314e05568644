// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cancel-pipeline`: sets a pipeline's status to CANCELLING directly in
//! the database. Picked up by the Run Worker on its next tick, which calls
//! `runner.cancel()`. Grounded on `original_source/CancelPipeline.py`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use cc_core::{AnalysisId, ErrorType, Status};
use cc_db::DatabaseGateway;
use clap::Parser;

/// Statuses from which a pipeline can still be cancelled; past this point
/// it has already reached a terminal outcome.
const CANCELLABLE: [Status; 4] = [Status::Idle, Status::Ready, Status::Loading, Status::Running];

#[derive(Parser)]
#[command(name = "cancel-pipeline", about = "Cancel a queued or running pipeline")]
struct Args {
    /// Path to the daemon's TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Database id of the pipeline to cancel.
    analysis_id: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let id = AnalysisId::new(args.analysis_id);

    let database_url = cc_cli::config::database_url(&args.config)?;
    let db = DatabaseGateway::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    let mut tx = db.begin().await.context("failed to open transaction")?;

    if !db.pipeline_exists(&mut tx, id).await? {
        bail!("pipeline with id '{}' doesn't exist in database!", args.analysis_id);
    }

    let current = db.current_status(&mut tx, id).await?;
    if !CANCELLABLE.contains(&current) {
        bail!(
            "not cancelling because pipeline is past the point of cancelling! current status: '{current}'"
        );
    }

    db.update_status(&mut tx, id, Status::Cancelling).await?;
    db.update_error_type(&mut tx, id, ErrorType::Cancel, "Manually cancelled by user.")
        .await?;
    tx.commit().await.context("failed to commit cancellation")?;

    println!("successfully cancelled pipeline with id: {}!", args.analysis_id);
    Ok(())
}
