// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn terminal_states_are_success_and_failed() {
    assert!(Status::Success.is_terminal());
    assert!(Status::Failed.is_terminal());
    for s in Status::ALL {
        if s != Status::Success && s != Status::Failed {
            assert!(!s.is_terminal(), "{s:?} should not be terminal");
        }
    }
}

#[test]
fn active_excludes_idle_and_terminal() {
    assert!(!Status::Idle.is_active());
    assert!(!Status::Success.is_active());
    assert!(!Status::Failed.is_active());
    assert!(Status::Ready.is_active());
    assert!(Status::Loading.is_active());
    assert!(Status::Running.is_active());
    assert!(Status::Cancelling.is_active());
    assert!(Status::Destroying.is_active());
    assert!(Status::Finished.is_active());
}

#[test]
fn loading_slot_counts_ready_and_loading_only() {
    assert!(Status::Ready.is_loading_slot());
    assert!(Status::Loading.is_loading_slot());
    assert!(!Status::Running.is_loading_slot());
    assert!(!Status::Idle.is_loading_slot());
}

#[test]
fn db_str_round_trips() {
    for s in Status::ALL {
        let round_tripped = Status::from_db_str(s.as_db_str());
        assert_eq!(round_tripped, Some(s));
    }
}

#[test]
fn from_db_str_rejects_unknown() {
    assert_eq!(Status::from_db_str("bogus"), None);
}

#[test]
fn display_matches_db_str() {
    assert_eq!(Status::Running.to_string(), "running");
}
