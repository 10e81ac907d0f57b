//! Process Descriptor Table

use congestion::{CongestionSnapshot, SharedProcState};
use core_types::{CoreId, CoreSet, ProcessId};
use resources::SchedSpec;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Bookkeeping for one attached process
#[derive(Debug, Clone)]
pub struct ProcessDescriptor {
    id: ProcessId,
    spec: SchedSpec,
    shared: Arc<SharedProcState>,
    owned: CoreSet,
    congestion: CongestionSnapshot,
    attached_epoch: u64,
}

impl ProcessDescriptor {
    pub(crate) fn new(
        id: ProcessId,
        spec: SchedSpec,
        shared: Arc<SharedProcState>,
        attached_epoch: u64,
    ) -> Self {
        let width = spec.thread_count as usize;
        Self {
            id,
            spec,
            shared,
            owned: CoreSet::new(),
            congestion: CongestionSnapshot::empty(width),
            attached_epoch,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn spec(&self) -> &SchedSpec {
        &self.spec
    }

    pub fn shared(&self) -> &Arc<SharedProcState> {
        &self.shared
    }

    pub fn owned(&self) -> &CoreSet {
        &self.owned
    }

    pub fn owned_count(&self) -> usize {
        self.owned.len()
    }

    /// Last congestion snapshot delivered to the policy
    pub fn congestion(&self) -> &CongestionSnapshot {
        &self.congestion
    }

    /// Epoch during which the process attached
    pub fn attached_epoch(&self) -> u64 {
        self.attached_epoch
    }

    pub fn at_max_cores(&self) -> bool {
        self.owned.len() >= self.spec.max_cores as usize
    }

    /// True when every execution context already has a core
    pub fn threads_exhausted(&self) -> bool {
        self.owned.len() >= self.spec.thread_count as usize
    }

    /// Cores held above the guarantee
    pub fn burst_count(&self) -> usize {
        self.owned
            .len()
            .saturating_sub(self.spec.guaranteed_cores as usize)
    }

    /// Cores still missing to reach the guarantee
    pub fn guarantee_deficit(&self) -> usize {
        (self.spec.guaranteed_cores as usize).saturating_sub(self.owned.len())
    }

    /// Execution contexts the runtime reports running
    pub fn threads_active(&self) -> u32 {
        self.shared.active_thread_count()
    }

    /// Execution contexts the runtime reports parked
    pub fn threads_avail(&self) -> u32 {
        self.shared.threads_avail()
    }

    pub(crate) fn add_core(&mut self, core: CoreId) {
        self.owned.insert(core);
    }

    pub(crate) fn remove_core(&mut self, core: CoreId) -> bool {
        self.owned.remove(core)
    }

    pub(crate) fn take_cores(&mut self) -> CoreSet {
        self.owned.take()
    }

    pub(crate) fn set_congestion(&mut self, snapshot: CongestionSnapshot) {
        self.congestion = snapshot;
    }
}

/// Attached processes, iterated in ascending id order
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    processes: BTreeMap<ProcessId, ProcessDescriptor>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            processes: BTreeMap::new(),
        }
    }

    pub fn get(&self, process: ProcessId) -> Option<&ProcessDescriptor> {
        self.processes.get(&process)
    }

    pub(crate) fn get_mut(&mut self, process: ProcessId) -> Option<&mut ProcessDescriptor> {
        self.processes.get_mut(&process)
    }

    pub fn contains(&self, process: ProcessId) -> bool {
        self.processes.contains_key(&process)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessDescriptor> {
        self.processes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.processes.keys().copied()
    }

    /// Sum of every attached guarantee
    pub fn guaranteed_total(&self) -> u32 {
        self.processes
            .values()
            .map(|descriptor| descriptor.spec.guaranteed_cores)
            .sum()
    }

    pub(crate) fn insert(&mut self, descriptor: ProcessDescriptor) {
        self.processes.insert(descriptor.id, descriptor);
    }

    pub(crate) fn remove(&mut self, process: ProcessId) -> Option<ProcessDescriptor> {
        self.processes.remove(&process)
    }
}
