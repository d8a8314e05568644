// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tick()` needs a live Postgres instance and is covered by the workspace
//! integration tests; this exercises the connection-independent finished-
//! runner outcome table from spec.md §4.4.

use cc_core::{ErrorType, Status};

use super::finished_outcome;

#[test]
fn a_clean_runner_becomes_the_report_placeholder() {
    let (status, err_type, _) = finished_outcome(ErrorType::None, "");
    assert_eq!(status, Status::Failed);
    assert_eq!(err_type, ErrorType::Report);
}

#[test]
fn a_cancelled_runner_keeps_its_cancel_message() {
    let (status, err_type, msg) = finished_outcome(ErrorType::Cancel, "pipeline cancelled");
    assert_eq!(status, Status::Failed);
    assert_eq!(err_type, ErrorType::Cancel);
    assert_eq!(msg, "pipeline cancelled");
}

#[test]
fn any_other_error_type_is_preserved_verbatim() {
    let (status, err_type, msg) = finished_outcome(ErrorType::Run, "exit code 137");
    assert_eq!(status, Status::Failed);
    assert_eq!(err_type, ErrorType::Run);
    assert_eq!(msg, "exit code 137");
}
