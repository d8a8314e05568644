// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Constructing a `DaemonManager` needs a live database connection, a
//! platform factory, a report bus, and an email notifier, so its lifecycle
//! methods are covered by the workspace integration tests; this exercises
//! the connection-independent failure-email body.

use super::failure_body;

#[test]
fn a_plain_failure_has_no_trailing_message() {
    assert_eq!(failure_body(None), "CC-Daemon has failed!");
}

#[test]
fn an_error_message_is_appended_on_its_own_line() {
    assert_eq!(
        failure_body(Some("worker panicked")),
        "CC-Daemon has failed!\nworker panicked"
    );
}
