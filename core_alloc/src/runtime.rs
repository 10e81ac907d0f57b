//! Execution-context runtime collaborator

use core_types::{CoreId, ProcessId};

/// Starts and stops a process's execution contexts on cores
///
/// Implemented by the runtime side of the system. The allocator calls it
/// from the control thread only.
pub trait ExecutionRuntime: Send {
    /// Wakes one execution context of `process` on `core`
    ///
    /// Called after the registry already records `process` as the owner.
    fn run_on_core(&mut self, process: ProcessId, core: CoreId);

    /// Blocks until the context of `process` running on `core` reaches a
    /// safe preemption point and yields the core
    ///
    /// The wait must be bounded; the bound is the runtime's contract. The
    /// registry still records `process` as the owner while this runs.
    fn preempt(&mut self, process: ProcessId, core: CoreId);
}

/// Runtime that does nothing, for allocators driven purely by bookkeeping
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRuntime;

impl ExecutionRuntime for NullRuntime {
    fn run_on_core(&mut self, _process: ProcessId, _core: CoreId) {}

    fn preempt(&mut self, _process: ProcessId, _core: CoreId) {}
}
