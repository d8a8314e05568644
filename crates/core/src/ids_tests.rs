// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn analysis_id_displays_as_number() {
    let id = AnalysisId::new(42);
    assert_eq!(id.to_string(), "42");
}

#[test]
fn analysis_id_from_i64() {
    let id: AnalysisId = 7.into();
    assert_eq!(id.get(), 7);
}

#[test]
fn analysis_ids_are_orderable() {
    assert!(AnalysisId::new(1) < AnalysisId::new(2));
}

#[test]
fn report_id_wraps_a_string_ack_handle() {
    let id = ReportId::new("ack-123");
    assert_eq!(id.as_str(), "ack-123");
}
