// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `resize-queue`: edits the `[pipeline_queue]` section of the daemon's
//! config file in place. A subsequent SIGHUP to the running `ccd` applies
//! the new caps. Grounded on `original_source/ResizeQueue.py`, adapted to
//! this crate's CPU + loading-slot admission model (see DESIGN.md).

use std::path::PathBuf;

use anyhow::Result;
use cc_cli::config::{apply_resize_action, ResizeAction};
use clap::Parser;

#[derive(Parser)]
#[command(name = "resize-queue", about = "Resize the pipeline queue's admission caps")]
struct Args {
    /// Path to the daemon's TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// INCREASE | DECREASE | LOCK | RESET | CPU=<n> | LOAD=<n>
    action: ResizeAction,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (max_cpus, max_loading) = apply_resize_action(&args.config, args.action)?;

    println!("successfully updated pipeline queue!");
    println!("current pipeline queue quotas:\nmax cpus: {max_cpus}\nmax loading slots: {max_loading}");
    Ok(())
}
