//! Control-thread API trait and handle types

use crate::SchedError;
use congestion::{CongestionBits, SharedProcState};
use core_types::{CoreId, CoreSet, ProcessId};
use resources::SchedSpec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle returned to the launch subsystem by a successful attach
///
/// The runtime's execution contexts write congestion bits and thread counters
/// through `shared`; the allocator samples it once per epoch.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pub process: ProcessId,
    pub shared: Arc<SharedProcState>,
}

impl ProcessHandle {
    pub fn new(process: ProcessId, shared: Arc<SharedProcState>) -> Self {
        Self { process, shared }
    }
}

/// Summary of one epoch reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochReport {
    /// Epoch number, starting at 1 for the first reconciliation
    pub epoch: u64,
    /// Processes whose congestion changed and were re-delivered to the policy
    pub congestion_changes: usize,
    /// Cores that became idle since the previous epoch
    pub idle_edges: CoreSet,
    /// Cores granted during the reconciliation
    pub granted: usize,
    /// Cores taken back during the reconciliation
    pub reclaimed: usize,
}

/// The control-thread API
///
/// Every method must be called from the single control thread. Calling from
/// any other context is undefined by contract; `&mut self` makes the common
/// case impossible to get wrong.
///
/// # Fatal conditions
///
/// Attaching a live identity, detaching an identity that is not attached, or
/// targeting a reserved core are invariant violations. Implementations abort
/// rather than return.
pub trait SchedApi {
    /// Runs one epoch: delivers changed congestion, then reconciles
    fn poll_epoch(&mut self) -> EpochReport;

    /// Synchronous single-core request for a process that has runnable work
    /// and no idle execution context
    ///
    /// Fails without side effects when no core can be granted right now.
    fn add_core(&mut self, process: ProcessId) -> Result<CoreId, SchedError>;

    /// Admits a process
    ///
    /// On failure nothing is mutated.
    fn attach_process(
        &mut self,
        process: ProcessId,
        spec: SchedSpec,
    ) -> Result<ProcessHandle, SchedError>;

    /// Releases every core of `process` and forgets it
    fn detach_process(&mut self, process: ProcessId);

    /// Places `process` on `core`, preempting the current owner if needed
    fn assign_core(&mut self, process: ProcessId, core: CoreId) -> Result<(), SchedError>;

    /// Delivers a congestion snapshot outside the epoch sampling
    ///
    /// Ignored if it matches the last delivered snapshot.
    fn notify_congested(&mut self, process: ProcessId, threads: CongestionBits, io: CongestionBits);

    /// Cores currently owned by `process`, if attached
    fn process_cores(&self, process: ProcessId) -> Option<CoreSet>;

    /// Number of completed epochs
    fn epoch(&self) -> u64;
}
