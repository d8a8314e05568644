// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::FakeRunnerHandle;

#[tokio::test]
async fn cancel_is_callable_through_the_trait_object() {
    let runner: std::sync::Arc<dyn RunnerHandle> =
        std::sync::Arc::new(FakeRunnerHandle::new(AnalysisId::new(1), "job-1", 2, Status::Running));
    runner.cancel().await;
    assert_eq!(runner.status(), Status::Cancelling);
}

#[test]
fn resource_demand_carries_optional_mem_and_disk() {
    let demand = ResourceDemand {
        cpus: 4,
        mem: Some(8),
        disk: None,
        max_run_time_hours: 1.0,
    };
    assert_eq!(demand.cpus, 4);
    assert_eq!(demand.mem, Some(8));
    assert_eq!(demand.disk, None);
}
