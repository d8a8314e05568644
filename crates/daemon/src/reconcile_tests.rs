// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reconciliation query itself needs a live Postgres instance and is
//! covered by the workspace integration tests; this exercises the
//! connection-independent constant.

use super::ORPHAN_NOTE;

#[test]
fn orphan_note_mentions_daemon_start() {
    assert!(ORPHAN_NOTE.contains("daemon start"));
}
