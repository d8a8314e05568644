// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

struct CountingTask {
    ticks: AtomicUsize,
    fail_after: Option<usize>,
}

#[async_trait]
impl WorkerTask for CountingTask {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn tick(&self, _stop: &AtomicBool) -> Result<(), DaemonError> {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_after == Some(n) {
            return Err(DaemonError::Queue(cc_core::QueueError::DuplicateKey(
                cc_core::AnalysisId::new(1),
            )));
        }
        Ok(())
    }
}

/// A task whose single tick iterates a fixed number of items, checking
/// `stop` between each one — the same shape as the Launch Worker's tick.
struct ItemLoopTask {
    item_count: usize,
    items_seen: AtomicUsize,
}

#[async_trait]
impl WorkerTask for ItemLoopTask {
    fn name(&self) -> &'static str {
        "item-loop"
    }

    async fn tick(&self, stop: &AtomicBool) -> Result<(), DaemonError> {
        for _ in 0..self.item_count {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            self.items_seen.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(())
    }
}

#[tokio::test]
async fn stop_requested_mid_tick_is_observed_before_the_next_item() {
    let task = Arc::new(ItemLoopTask {
        item_count: 100,
        items_seen: AtomicUsize::new(0),
    });
    let handle = spawn(Arc::clone(&task), Duration::from_millis(5));

    // Let a handful of items process, then stop mid-tick.
    tokio::time::sleep(Duration::from_millis(22)).await;
    handle.stop();
    handle.join().await;

    let seen = task.items_seen.load(Ordering::SeqCst);
    assert!(seen < task.item_count, "tick should have exited early, saw {seen} items");
}

#[tokio::test]
async fn stop_flag_halts_the_loop_without_a_failure() {
    let task = Arc::new(CountingTask {
        ticks: AtomicUsize::new(0),
        fail_after: None,
    });
    let handle = spawn(Arc::clone(&task), Duration::from_millis(5));

    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.stop();
    handle.join().await;

    assert!(task.ticks.load(Ordering::SeqCst) >= 1);
    assert!(handle.check().is_ok());
}

#[tokio::test]
async fn a_failing_tick_is_captured_and_surfaced_by_check() {
    let task = Arc::new(CountingTask {
        ticks: AtomicUsize::new(0),
        fail_after: Some(1),
    });
    let handle = spawn(Arc::clone(&task), Duration::from_millis(5));

    handle.join().await;

    let err = handle.check().unwrap_err();
    assert!(matches!(err, DaemonError::WorkerFailed { worker, .. } if worker == "counting"));
}

#[tokio::test]
async fn check_is_idempotent_after_the_failure_is_consumed() {
    let task = Arc::new(CountingTask {
        ticks: AtomicUsize::new(0),
        fail_after: Some(1),
    });
    let handle = spawn(Arc::clone(&task), Duration::from_millis(5));

    handle.join().await;

    assert!(handle.check().is_err());
    assert!(handle.check().is_ok());
}
