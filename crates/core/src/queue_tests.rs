// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;
use crate::clock::SystemClock;
use crate::test_support::FakeRunnerHandle;

fn runner(id: i64, cpus: u32, status: Status) -> Arc<dyn RunnerHandle> {
    Arc::new(FakeRunnerHandle::new(AnalysisId::new(id), &format!("job-{id}"), cpus, status))
}

#[test]
fn admits_within_cpu_and_loading_caps() {
    let queue = PipelineQueue::new(8, 2);
    assert!(queue.can_admit(4));
    queue.add(runner(1, 4, Status::Ready)).unwrap();
    assert!(queue.can_admit(4));
    queue.add(runner(2, 4, Status::Ready)).unwrap();
    assert!(!queue.can_admit(1));
}

#[test]
fn rejects_when_cpu_cap_would_be_exceeded() {
    let queue = PipelineQueue::new(4, 4);
    queue.add(runner(1, 4, Status::Running)).unwrap();
    assert!(!queue.can_admit(1));
    let err = queue.add(runner(2, 1, Status::Ready)).unwrap_err();
    assert!(matches!(err, QueueError::ResourceExceeded(id) if id == AnalysisId::new(2)));
}

#[test]
fn rejects_duplicate_ids() {
    let queue = PipelineQueue::new(8, 8);
    queue.add(runner(1, 1, Status::Running)).unwrap();
    let err = queue.add(runner(1, 1, Status::Running)).unwrap_err();
    assert!(matches!(err, QueueError::DuplicateKey(id) if id == AnalysisId::new(1)));
}

#[test]
fn loading_slot_cap_counts_ready_and_loading_only() {
    let queue = PipelineQueue::new(100, 1);
    queue.add(runner(1, 1, Status::Ready)).unwrap();
    assert!(!queue.can_admit(1));

    let queue = PipelineQueue::new(100, 1);
    queue.add(runner(1, 1, Status::Running)).unwrap();
    assert!(queue.can_admit(1));
}

#[test]
fn remove_is_idempotent_and_frees_cpus() {
    let queue = PipelineQueue::new(4, 4);
    queue.add(runner(1, 4, Status::Running)).unwrap();
    assert_eq!(queue.current_cpus(), 4);
    queue.remove(AnalysisId::new(1));
    assert_eq!(queue.current_cpus(), 0);
    queue.remove(AnalysisId::new(1));
    assert_eq!(queue.current_cpus(), 0);
    queue.remove(AnalysisId::new(999));
}

#[test]
fn get_and_contains_reflect_membership() {
    let queue = PipelineQueue::new(8, 8);
    assert!(!queue.contains(AnalysisId::new(1)));
    queue.add(runner(1, 1, Status::Running)).unwrap();
    assert!(queue.contains(AnalysisId::new(1)));
    assert!(queue.get(AnalysisId::new(1)).is_some());
    assert!(queue.get(AnalysisId::new(2)).is_none());
}

#[test]
fn snapshot_preserves_insertion_order() {
    let queue = PipelineQueue::new(100, 100);
    queue.add(runner(3, 1, Status::Running)).unwrap();
    queue.add(runner(1, 1, Status::Running)).unwrap();
    queue.add(runner(2, 1, Status::Running)).unwrap();
    let ids: Vec<_> = queue.snapshot_all().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![AnalysisId::new(3), AnalysisId::new(1), AnalysisId::new(2)]);
}

#[test]
fn reconfiguring_caps_does_not_evict_existing_runners() {
    let queue = PipelineQueue::new(8, 8);
    queue.add(runner(1, 4, Status::Running)).unwrap();
    queue.set_max_cpus(1);
    assert_eq!(queue.len(), 1);
    assert!(!queue.can_admit(1));
}

#[test]
fn dump_includes_usage_and_per_runner_lines() {
    let queue = PipelineQueue::new(8, 8);
    queue.add(runner(1, 2, Status::Running)).unwrap();
    let text = queue.dump(&SystemClock);
    assert!(text.contains("2/8 cpus"));
    assert!(text.contains("job-1"));
    assert!(text.contains("running"));
}
