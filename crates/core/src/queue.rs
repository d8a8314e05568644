// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide, thread-safe registry of active pipelines with
//! multi-dimensional admission control.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use thiserror::Error;

use crate::clock::{hours_between, Clock};
use crate::ids::AnalysisId;
use crate::runner_handle::RunnerHandle;

/// Errors from queue mutation.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("runner {0} already present in the queue")]
    DuplicateKey(AnalysisId),
    #[error("adding runner {0} would exceed the resource caps")]
    ResourceExceeded(AnalysisId),
}

struct Totals {
    max_cpus: u32,
    max_loading: u32,
    current_cpus: u32,
}

/// Ordered-by-insertion mapping from runner id to runner handle, plus
/// running totals of committed resources. All public operations serialize
/// under a single mutex — admission, insertion, removal, and total-usage
/// reads appear atomic to callers.
pub struct PipelineQueue {
    inner: Mutex<Inner>,
}

struct Inner {
    runners: IndexMap<AnalysisId, Arc<dyn RunnerHandle>>,
    totals: Totals,
}

impl PipelineQueue {
    pub fn new(max_cpus: u32, max_loading: u32) -> Self {
        assert!(max_cpus > 0, "max_cpus must be positive");
        assert!(max_loading > 0, "max_loading must be positive");
        Self {
            inner: Mutex::new(Inner {
                runners: IndexMap::new(),
                totals: Totals {
                    max_cpus,
                    max_loading,
                    current_cpus: 0,
                },
            }),
        }
    }

    /// True iff admitting `req_cpus` more would not exceed `max_cpus`, and
    /// the loading-slot cap (runners currently READY or LOADING) would not
    /// be exceeded either.
    pub fn can_admit(&self, req_cpus: u32) -> bool {
        let inner = self.inner.lock();
        Self::can_admit_locked(&inner, req_cpus)
    }

    fn can_admit_locked(inner: &Inner, req_cpus: u32) -> bool {
        let cpu_ok = inner.totals.current_cpus + req_cpus <= inner.totals.max_cpus;
        let loading_count = inner
            .runners
            .values()
            .filter(|r| r.status().is_loading_slot())
            .count() as u32;
        let loading_ok = 1 + loading_count <= inner.totals.max_loading;
        cpu_ok && loading_ok
    }

    /// Inserts `runner`. Callers must have verified `can_admit` under the
    /// same lock region (i.e. immediately before calling `add`); the
    /// post-insert check here is a paranoia check for misuse, not the
    /// primary admission gate.
    pub fn add(&self, runner: Arc<dyn RunnerHandle>) -> Result<(), QueueError> {
        let mut inner = self.inner.lock();
        let id = runner.id();

        if inner.runners.contains_key(&id) {
            return Err(QueueError::DuplicateKey(id));
        }

        let req_cpus = runner.demand().cpus;
        inner.totals.current_cpus += req_cpus;
        inner.runners.insert(id, runner);

        if inner.totals.current_cpus > inner.totals.max_cpus {
            // Roll back: this should only fire if a caller skipped can_admit.
            let removed = inner.runners.shift_remove(&id);
            if let Some(removed) = removed {
                inner.totals.current_cpus -= removed.demand().cpus;
            }
            return Err(QueueError::ResourceExceeded(id));
        }

        Ok(())
    }

    /// Removes the entry, subtracting its resource demand from the running
    /// totals. Idempotent: a no-op if the id is absent (the original's
    /// `remove_pipeline` raised on an unknown id; callers here are more
    /// forgiving).
    pub fn remove(&self, id: AnalysisId) {
        let mut inner = self.inner.lock();
        if let Some(removed) = inner.runners.shift_remove(&id) {
            inner.totals.current_cpus -= removed.demand().cpus;
        }
    }

    pub fn get(&self, id: AnalysisId) -> Option<Arc<dyn RunnerHandle>> {
        self.inner.lock().runners.get(&id).cloned()
    }

    pub fn contains(&self, id: AnalysisId) -> bool {
        self.inner.lock().runners.contains_key(&id)
    }

    /// All runners, in insertion order.
    pub fn snapshot_all(&self) -> Vec<Arc<dyn RunnerHandle>> {
        self.inner.lock().runners.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().runners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().runners.len()
    }

    /// Live reconfiguration. Does not evict existing runners even if the
    /// new cap is exceeded; the violation self-resolves as runners finish.
    pub fn set_max_cpus(&self, n: u32) {
        self.inner.lock().totals.max_cpus = n;
    }

    pub fn set_max_loading(&self, n: u32) {
        self.inner.lock().totals.max_loading = n;
    }

    pub fn max_cpus(&self) -> u32 {
        self.inner.lock().totals.max_cpus
    }

    pub fn max_loading(&self) -> u32 {
        self.inner.lock().totals.max_loading
    }

    pub fn current_cpus(&self) -> u32 {
        self.inner.lock().totals.current_cpus
    }

    /// Human-readable dump: usage stats plus per-runner (id, status,
    /// runtime-hours), matching the original source's `__str__`.
    pub fn dump(&self, clock: &dyn Clock) -> String {
        let inner = self.inner.lock();
        let now = clock.now();
        let loading_count = inner
            .runners
            .values()
            .filter(|r| r.status().is_loading_slot())
            .count();
        let mut out = format!(
            "PipelineQueue: {}/{} cpus, {}/{} loading, {} active\n",
            inner.totals.current_cpus,
            inner.totals.max_cpus,
            loading_count,
            inner.totals.max_loading,
            inner.runners.len(),
        );
        for (id, runner) in &inner.runners {
            let runtime_hours = runner
                .start_time()
                .map(|start| hours_between(start, now))
                .unwrap_or(0.0);
            out.push_str(&format!(
                "  - {} [{}] status={} runtime={:.2}h\n",
                id,
                runner.name(),
                runner.status(),
                runtime_hours
            ));
        }
        out
    }
}

impl fmt::Debug for PipelineQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("PipelineQueue")
            .field("max_cpus", &inner.totals.max_cpus)
            .field("max_loading", &inner.totals.max_loading)
            .field("current_cpus", &inner.totals.current_cpus)
            .field("count", &inner.runners.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
