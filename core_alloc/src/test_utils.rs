//! Test utilities for allocation testing
//!
//! Helpers shared by this crate's tests, the policy tests and the
//! integration tests: the standard scenario machine and a runtime that
//! remembers what it was asked to do.

use crate::runtime::ExecutionRuntime;
use core_types::{CoreId, ProcessId};
use std::sync::{Arc, Mutex};
use topology::{CoreRole, Topology};

/// Eight cores: core 0 dataplane, core 1 control, cores 2..=7 General
pub fn scenario_topology() -> Topology {
    sized_topology(8)
}

/// `core_count` cores with the first two reserved like [`scenario_topology`]
///
/// # Panics
///
/// Panics if `core_count` is below 3.
pub fn sized_topology(core_count: usize) -> Topology {
    Topology::builder(core_count)
        .reserve(0, CoreRole::ReservedDataplane)
        .reserve(1, CoreRole::ReservedControl)
        .build()
        .expect("scenario topology is valid")
}

/// One call the allocator made into the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeCall {
    Run(ProcessId, CoreId),
    Preempt(ProcessId, CoreId),
}

/// Runtime that records every call in order
///
/// The call list is shared so a test can keep a handle after boxing the
/// runtime into an allocator.
#[derive(Debug, Default, Clone)]
pub struct RecordingRuntime {
    calls: Arc<Mutex<Vec<RuntimeCall>>>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the recorded calls
    pub fn calls(&self) -> Arc<Mutex<Vec<RuntimeCall>>> {
        Arc::clone(&self.calls)
    }

    fn push(&self, call: RuntimeCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl ExecutionRuntime for RecordingRuntime {
    fn run_on_core(&mut self, process: ProcessId, core: CoreId) {
        self.push(RuntimeCall::Run(process, core));
    }

    fn preempt(&mut self, process: ProcessId, core: CoreId) {
        self.push(RuntimeCall::Preempt(process, core));
    }
}
