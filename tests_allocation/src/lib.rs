//! Allocation Test Utilities
//!
//! This crate provides shared utilities for the allocation integration tests.
//!
//! ## Test Philosophy
//!
//! - **Invariants under any sequence**: ownership stays a partition whatever
//!   the order of attach, detach, grant and placement
//! - **Failures are side-effect free**: a refused attach or grant leaves the
//!   registry byte-for-byte identical
//! - **Deterministic decisions**: the same notifications give the same grants

use core_alloc::test_utils::{scenario_topology, RecordingRuntime};
use core_alloc::{ExecutionRuntime, NullRuntime};
use core_scheduler::CoreScheduler;
use core_types::ProcessId;
use policy::{DefaultPolicy, SchedPolicy};
use resources::SchedSpec;
use sched_api::{ProcessHandle, SchedApi};
use std::sync::Arc;

/// Scheduler over the eight-core scenario machine with the default policy
pub fn test_scheduler() -> CoreScheduler {
    scheduler_with(Box::new(DefaultPolicy::new()), Box::new(NullRuntime))
}

/// Like [`test_scheduler`], recording runtime calls
pub fn recording_scheduler() -> (CoreScheduler, RecordingRuntime) {
    let runtime = RecordingRuntime::new();
    let sched = scheduler_with(Box::new(DefaultPolicy::new()), Box::new(runtime.clone()));
    (sched, runtime)
}

pub fn scheduler_with(
    policy: Box<dyn SchedPolicy>,
    runtime: Box<dyn ExecutionRuntime>,
) -> CoreScheduler {
    CoreScheduler::new(Arc::new(scenario_topology()), policy, runtime)
}

/// Attaches `raw` with `{max, guaranteed}`, panicking on denial
pub fn attach(sched: &mut CoreScheduler, raw: u64, max: u32, guaranteed: u32) -> ProcessHandle {
    sched
        .attach_process(ProcessId::new(raw), SchedSpec::new(max, guaranteed))
        .expect("attach should be admitted")
}

/// Serialized registry, for byte-for-byte comparisons
pub fn registry_json(sched: &CoreScheduler) -> String {
    serde_json::to_string(sched.allocator().registry()).expect("registry serializes")
}
