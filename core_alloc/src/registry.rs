//! Core Registry: per-core ownership and status

use crate::invariant::{fatal, Violation};
use core_types::{CoreId, CoreSet, ProcessId};
use serde::{Deserialize, Serialize};
use topology::{CoreRole, Topology};

/// Who holds a core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreOwner {
    /// General core not assigned to anyone
    Unassigned,
    /// Reserved-role core, never assigned
    Reserved,
    /// Owned by an attached process
    Process(ProcessId),
}

/// State of one core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreRecord {
    role: CoreRole,
    owner: CoreOwner,
    busy: bool,
}

impl CoreRecord {
    pub fn role(&self) -> CoreRole {
        self.role
    }

    pub fn owner(&self) -> CoreOwner {
        self.owner
    }

    /// True while an execution context of the owner runs on the core
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_idle(&self) -> bool {
        self.role == CoreRole::General && self.owner == CoreOwner::Unassigned
    }
}

/// Partition counts of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCounts {
    pub owned: usize,
    pub reserved: usize,
    pub idle: usize,
}

impl RegistryCounts {
    pub fn total(&self) -> usize {
        self.owned + self.reserved + self.idle
    }
}

/// One record per core of the topology
///
/// Also tracks the edge-triggered set of cores that became idle and are
/// still idle, drained once per epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreRegistry {
    cores: Vec<CoreRecord>,
    idle_edges: CoreSet,
}

impl CoreRegistry {
    /// Creates a registry with every General core idle
    pub fn new(topology: &Topology) -> Self {
        let cores = topology
            .cores()
            .map(|core| {
                let role = topology.role(core);
                CoreRecord {
                    role,
                    owner: if role.is_reserved() {
                        CoreOwner::Reserved
                    } else {
                        CoreOwner::Unassigned
                    },
                    busy: false,
                }
            })
            .collect();
        Self {
            cores,
            idle_edges: CoreSet::new(),
        }
    }

    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    /// Record of `core`
    ///
    /// An out-of-range core is fatal.
    pub fn record(&self, core: CoreId) -> &CoreRecord {
        match self.cores.get(core.index()) {
            Some(record) => record,
            None => fatal(Violation::CoreOutOfRange(core)),
        }
    }

    pub fn owner(&self, core: CoreId) -> CoreOwner {
        self.record(core).owner
    }

    pub fn is_idle(&self, core: CoreId) -> bool {
        self.record(core).is_idle()
    }

    /// Idle General cores, ascending
    pub fn idle_cores(&self) -> impl Iterator<Item = CoreId> + '_ {
        self.cores
            .iter()
            .enumerate()
            .filter(|(_, record)| record.is_idle())
            .map(|(index, _)| CoreId::new(index as u32))
    }

    pub fn idle_count(&self) -> usize {
        self.counts().idle
    }

    pub fn counts(&self) -> RegistryCounts {
        let mut counts = RegistryCounts {
            owned: 0,
            reserved: 0,
            idle: 0,
        };
        for record in &self.cores {
            match record.owner {
                CoreOwner::Process(_) => counts.owned += 1,
                CoreOwner::Reserved => counts.reserved += 1,
                CoreOwner::Unassigned => counts.idle += 1,
            }
        }
        counts
    }

    /// Cores that became idle since the last drain and are still idle
    pub fn idle_edges(&self) -> &CoreSet {
        &self.idle_edges
    }

    /// Drains the idle-edge set
    pub fn take_idle_edges(&mut self) -> CoreSet {
        self.idle_edges.take()
    }

    /// Idle -> Owned(process)
    pub(crate) fn set_owner(&mut self, core: CoreId, process: ProcessId) {
        let record = self.record_mut(core);
        if record.role.is_reserved() {
            fatal(Violation::ReservedCore {
                core,
                role: record.role,
            });
        }
        if record.owner != CoreOwner::Unassigned {
            fatal(Violation::OwnershipMismatch {
                core,
                expected: CoreOwner::Unassigned,
                found: record.owner,
            });
        }
        record.owner = CoreOwner::Process(process);
        record.busy = true;
        self.idle_edges.remove(core);
    }

    /// Owned(process) -> Idle
    pub(crate) fn set_idle(&mut self, core: CoreId, process: ProcessId) {
        let record = self.record_mut(core);
        if record.owner != CoreOwner::Process(process) {
            fatal(Violation::OwnershipMismatch {
                core,
                expected: CoreOwner::Process(process),
                found: record.owner,
            });
        }
        record.owner = CoreOwner::Unassigned;
        record.busy = false;
        self.idle_edges.insert(core);
    }

    fn record_mut(&mut self, core: CoreId) -> &mut CoreRecord {
        match self.cores.get_mut(core.index()) {
            Some(record) => record,
            None => fatal(Violation::CoreOutOfRange(core)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> Topology {
        Topology::builder(4)
            .reserve(0, CoreRole::ReservedDataplane)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_registry_partition() {
        let registry = CoreRegistry::new(&topology());
        let counts = registry.counts();
        assert_eq!(counts.reserved, 1);
        assert_eq!(counts.idle, 3);
        assert_eq!(counts.owned, 0);
        assert_eq!(counts.total(), 4);
        assert_eq!(registry.owner(CoreId::new(0)), CoreOwner::Reserved);
    }

    #[test]
    fn test_owner_then_idle_records_edge() {
        let mut registry = CoreRegistry::new(&topology());
        let pid = ProcessId::new(1);
        registry.set_owner(CoreId::new(2), pid);
        assert!(registry.record(CoreId::new(2)).is_busy());
        assert_eq!(registry.owner(CoreId::new(2)), CoreOwner::Process(pid));
        assert!(registry.idle_edges().is_empty());

        registry.set_idle(CoreId::new(2), pid);
        assert!(registry.is_idle(CoreId::new(2)));
        assert!(registry.idle_edges().contains(CoreId::new(2)));

        let edges = registry.take_idle_edges();
        assert_eq!(edges.len(), 1);
        assert!(registry.idle_edges().is_empty());
    }

    #[test]
    fn test_regrant_clears_edge() {
        let mut registry = CoreRegistry::new(&topology());
        let pid = ProcessId::new(1);
        registry.set_owner(CoreId::new(3), pid);
        registry.set_idle(CoreId::new(3), pid);
        registry.set_owner(CoreId::new(3), ProcessId::new(2));
        assert!(registry.idle_edges().is_empty());
    }

    #[test]
    fn test_idle_cores_ascending() {
        let mut registry = CoreRegistry::new(&topology());
        registry.set_owner(CoreId::new(2), ProcessId::new(1));
        let idle: Vec<u32> = registry.idle_cores().map(|c| c.0).collect();
        assert_eq!(idle, vec![1, 3]);
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_reserved_core_cannot_be_owned() {
        let mut registry = CoreRegistry::new(&topology());
        registry.set_owner(CoreId::new(0), ProcessId::new(1));
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_double_grant_is_fatal() {
        let mut registry = CoreRegistry::new(&topology());
        registry.set_owner(CoreId::new(1), ProcessId::new(1));
        registry.set_owner(CoreId::new(1), ProcessId::new(2));
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_out_of_range_is_fatal() {
        let registry = CoreRegistry::new(&topology());
        registry.record(CoreId::new(9));
    }
}
