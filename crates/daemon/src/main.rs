// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ccd`: the CC-Daemon binary.
//!
//! Parses `--config`, builds every component wired to its no-op adapter
//! (the concrete cloud platform/report-bus integrations are out of scope —
//! see `cc-adapters`), validates, and runs the [`DaemonManager`] supervisory
//! loop until SIGTERM/SIGINT. Grounded on `original_source/RunDaemon.py`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;
use std::sync::Arc;

use cc_adapters::{NoOpPlatformFactory, NoOpReportSource, SmtpEmailNotifier};
use cc_core::SystemClock;
use cc_daemon::{Config, DaemonManager};
use cc_db::DatabaseGateway;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match parse_args() {
        Ok(path) => path,
        Err(code) => std::process::exit(code),
    };

    let _log_guard = setup_logging();

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: failed to load config: {e}");
            std::process::exit(1);
        }
    };

    info!("starting CC-Daemon");

    let manager = match build_manager(&config, config_path).await {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            error!(error = %e, "failed to construct CC-Daemon");
            std::process::exit(1);
        }
    };

    info!("validating CC-Daemon");
    if let Err(e) = manager.validate().await {
        error!(error = %e, "CC-Daemon failed to validate");
        manager.shutdown(Some(&e.to_string())).await;
        std::process::exit(1);
    }
    info!("CC-Daemon is valid!");

    if let Err(e) = manager.summon().await {
        error!(error = %e, "failed to summon CC-Daemon");
        manager.shutdown(Some(&e.to_string())).await;
        std::process::exit(1);
    }

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let supervisor = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move { manager.run_until_stopped().await }
    });
    tokio::pin!(supervisor);

    let err_msg = loop {
        tokio::select! {
            _ = sighup.recv() => {
                info!("SIGHUP received, reloading pipeline queue limits");
                manager.reload_queue_limits();
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down");
                manager.stop();
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down");
                manager.stop();
            }
            result = &mut supervisor => {
                break match result {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(join_err) => Some(join_err.to_string()),
                };
            }
        }
    };

    if let Some(msg) = &err_msg {
        error!(error = %msg, "CC-Daemon failed");
    }
    manager.shutdown(err_msg.as_deref()).await;
    info!("CC-Daemon exited gracefully");

    if err_msg.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

type Manager = DaemonManager<NoOpPlatformFactory, NoOpReportSource, SmtpEmailNotifier>;

async fn build_manager(
    config: &Config,
    config_path: PathBuf,
) -> Result<Manager, Box<dyn std::error::Error>> {
    let db = Arc::new(DatabaseGateway::connect(&config.db_helper.database_url()).await?);
    let factory = Arc::new(NoOpPlatformFactory::new());
    let report_source = Arc::new(NoOpReportSource::new());
    let email = Arc::new(SmtpEmailNotifier::new(
        &config.email_reporter.subject_prefix,
        &config.email_reporter.sender_address,
        &config.email_reporter.sender_pwd,
        &config.email_reporter.host,
        config.email_reporter.port,
        &config.email_recipients,
    )?);
    let clock = Arc::new(SystemClock);

    Ok(DaemonManager::new(config, config_path, db, factory, report_source, email, clock).await?)
}

/// Parse `--config <path>` plus `--version`/`--help`. Returns the exit code
/// to use on `Err` (0 for info flags, 1 for usage errors), mirroring
/// `RunDaemon.py`'s `argparse` contract minus `--platform` (this repository
/// wires a single no-op platform factory; see `cc-adapters`).
fn parse_args() -> Result<PathBuf, i32> {
    let mut args = std::env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("ccd {}", env!("CARGO_PKG_VERSION"));
                return Err(0);
            }
            "--help" | "-h" => {
                print_help();
                return Err(0);
            }
            "--config" => {
                let value = args.next().ok_or_else(|| {
                    eprintln!("error: --config requires a value");
                    1
                })?;
                config_path = Some(PathBuf::from(value));
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                print_usage();
                return Err(1);
            }
        }
    }

    config_path.ok_or_else(|| {
        eprintln!("error: --config is required");
        print_usage();
        1
    })
}

fn print_usage() {
    eprintln!("Usage: ccd --config <path>");
}

fn print_help() {
    println!("ccd {}", env!("CARGO_PKG_VERSION"));
    println!("CC-Daemon - schedules and runs bioinformatics pipelines on a cloud platform");
    println!();
    println!("USAGE:");
    println!("    ccd --config <path>");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>  Path to the daemon's TOML configuration file");
    println!("    -h, --help       Print help information");
    println!("    -V, --version    Print version information");
}

/// Structured logging to stderr, matching the teacher's non-blocking
/// `tracing-appender` writer and `EnvFilter` setup but without file
/// rotation — the original (`RunDaemon.py::configure_logging`) logs to
/// stderr too, leaving file management to the process supervisor.
fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    guard
}
