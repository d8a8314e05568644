// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tick()` needs a live Postgres instance and a built platform factory and
//! is covered by the workspace integration tests; this exercises the
//! connection-independent resource-demand conversion.

use super::resource_u32;

#[test]
fn converts_a_positive_value() {
    assert_eq!(resource_u32(Some(4)), Some(4));
}

#[test]
fn none_stays_none() {
    assert_eq!(resource_u32(None), None);
}

#[test]
fn a_negative_column_value_is_dropped_rather_than_wrapped() {
    assert_eq!(resource_u32(Some(-1)), None);
}
