//! Black-box specs for the `cancel-pipeline` binary.
//!
//! Limited to paths that don't require a live database: argument parsing
//! and config-file handling fail before any connection is attempted.

use crate::prelude::*;

#[test]
fn help_shows_usage() {
    cancel_pipeline().args(&["--help"]).passes().stdout_has("Usage");
}

#[test]
fn missing_analysis_id_fails() {
    cancel_pipeline().args(&["--config", "/nonexistent/ccd.toml"]).fails();
}

#[test]
fn missing_config_file_fails_before_connecting() {
    cancel_pipeline()
        .args(&["--config", "/nonexistent/ccd.toml", "42"])
        .fails()
        .stderr_has("failed to read config file");
}
