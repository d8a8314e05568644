// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tick()`/`apply()` need a live Postgres instance and a platform driver
//! and are covered by the workspace integration tests; this exercises the
//! connection-independent QC report parsing and dedup.

use super::parse_qc_report;

const SAMPLE: &str = r#"
{
  "sample-1": [
    {"Name": "GC Content", "Value": "48.2", "Module": "FastQC", "Source": "reads.fq", "Note": ""},
    {"Name": "GC Content", "Value": "48.2", "Module": "FastQC", "Source": "reads.fq", "Note": ""},
    {"Name": "Total Reads", "Value": "1200000", "Module": "FastQC", "Source": "reads.fq", "Note": "within spec"}
  ],
  "sample-2": [
    {"Name": "GC Content", "Value": "51.0", "Module": "FastQC", "Source": "", "Note": ""}
  ]
}
"#;

#[test]
fn parses_every_sample_and_drops_exact_duplicates() {
    let rows = parse_qc_report(SAMPLE.as_bytes(), "qc-task", "s3://bucket/qc.json").unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn metric_name_folds_in_the_module() {
    let rows = parse_qc_report(SAMPLE.as_bytes(), "qc-task", "s3://bucket/qc.json").unwrap();
    assert!(rows.iter().any(|r| r.metric == "FastQC.GC Content"));
}

#[test]
fn note_gains_the_source_file_when_present() {
    let rows = parse_qc_report(SAMPLE.as_bytes(), "qc-task", "s3://bucket/qc.json").unwrap();
    let total_reads = rows.iter().find(|r| r.metric == "FastQC.Total Reads").unwrap();
    assert!(total_reads.notes.contains("within spec"));
    assert!(total_reads.notes.contains("source=reads.fq"));
}

#[test]
fn empty_source_leaves_the_note_untouched() {
    let rows = parse_qc_report(SAMPLE.as_bytes(), "qc-task", "s3://bucket/qc.json").unwrap();
    let sample_2 = rows
        .iter()
        .find(|r| r.sample == "sample-2" && r.metric == "FastQC.GC Content")
        .unwrap();
    assert_eq!(sample_2.notes, "");
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(parse_qc_report(b"not json", "qc-task", "path").is_err());
}
