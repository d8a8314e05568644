// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use super::*;

fn cache_with(status: &'static str, id: i64) -> StatusCache {
    let mut statuses = HashMap::new();
    statuses.insert(status, id);
    StatusCache::from_maps(statuses, HashMap::new())
}

#[test]
fn status_id_returns_cached_value() {
    let cache = cache_with("idle", 7);
    assert_eq!(cache.status_id(Status::Idle).unwrap(), 7);
}

#[test]
fn status_id_errors_when_not_synced() {
    let cache = StatusCache::default();
    let err = cache.status_id(Status::Idle).unwrap_err();
    assert!(matches!(err, DbError::UnknownStatus(s) if s == "idle"));
}

#[test]
fn error_type_id_errors_when_not_synced() {
    let cache = StatusCache::default();
    let err = cache.error_type_id(ErrorType::Cancel).unwrap_err();
    assert!(matches!(err, DbError::UnknownErrorType(s) if s == "cancel"));
}
