//! Black-box specs for the `resize-queue` binary.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::prelude::*;

const VALID_TOML: &str = r#"
email_recipients = ["oncall@example.com"]

[db_helper]
username = "ccd"
password = "secret"
database = "cc"
host = "db.internal"

[pipeline_queue]
max_cpus = 16
max_loading = 4

[platform]
pinned_commit = "abc123"

[report_queue]
report_sub = "cc-reports-sub"
report_topic = "cc-reports-topic"

[email_reporter]
subject_prefix = "[ccd]"
sender_address = "ccd@example.com"
sender_pwd = "secret"
host = "smtp.example.com"
port = 587
"#;

fn fixture() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(VALID_TOML.as_bytes()).expect("write fixture");
    file
}

#[test]
fn help_shows_usage() {
    resize_queue().args(&["--help"]).passes().stdout_has("Usage");
}

#[test]
fn increase_doubles_both_caps_and_reports_them() {
    let file = fixture();
    let path = file.path().to_str().expect("utf8 path");

    resize_queue()
        .args(&["--config", path, "INCREASE"])
        .passes()
        .stdout_has("max cpus: 32")
        .stdout_has("max loading slots: 8");

    let rewritten = std::fs::read_to_string(file.path()).expect("read rewritten config");
    let doc: toml::Value = toml::from_str(&rewritten).expect("rewritten config parses");
    assert_eq!(doc["pipeline_queue"]["max_cpus"].as_integer(), Some(32));
    assert_eq!(doc["pipeline_queue"]["max_loading"].as_integer(), Some(8));

    // Untouched sections survive byte-for-byte.
    assert!(rewritten.contains("sender_address = \"ccd@example.com\""));
    assert!(rewritten.contains("report_sub = \"cc-reports-sub\""));
}

#[test]
fn lock_zeroes_both_caps() {
    let file = fixture();
    let path = file.path().to_str().expect("utf8 path");

    resize_queue().args(&["--config", path, "LOCK"]).passes();

    let rewritten = std::fs::read_to_string(file.path()).expect("read rewritten config");
    let doc: toml::Value = toml::from_str(&rewritten).expect("rewritten config parses");
    assert_eq!(doc["pipeline_queue"]["max_cpus"].as_integer(), Some(0));
    assert_eq!(doc["pipeline_queue"]["max_loading"].as_integer(), Some(0));
}

#[test]
fn explicit_cpu_action_leaves_loading_untouched() {
    let file = fixture();
    let path = file.path().to_str().expect("utf8 path");

    resize_queue()
        .args(&["--config", path, "CPU=40"])
        .passes()
        .stdout_has("max cpus: 40")
        .stdout_has("max loading slots: 4");
}

#[test]
fn unrecognized_action_fails_with_usage_hint() {
    let file = fixture();
    let path = file.path().to_str().expect("utf8 path");

    resize_queue()
        .args(&["--config", path, "MANUAL"])
        .fails()
        .stderr_has("invalid value");
}

#[test]
fn missing_config_file_fails() {
    resize_queue().args(&["--config", "/nonexistent/ccd.toml", "RESET"]).fails();
}
