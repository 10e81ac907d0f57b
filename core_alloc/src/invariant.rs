//! Invariant checks over the registry and the descriptor table
//!
//! These are the conditions that must hold at every observable point, that
//! is, outside an in-flight allocation primitive:
//! - every core is exactly one of unassigned-general, reserved, or owned by
//!   exactly one attached process; reserved cores are never owned
//! - a core is busy iff a process owns it
//! - `owned + reserved + idle == N`
//! - every descriptor's owned set matches the registry, holds at most
//!   `max_cores`, and its runtime reports at most `thread_count` active
//!   execution contexts
//!
//! A failed check is never returned to a caller as an ordinary error. It
//! reaches [`fatal`], which logs and panics; release builds abort.

use crate::process_table::ProcessTable;
use crate::registry::{CoreOwner, CoreRegistry};
use core_types::{CoreId, ProcessId};
use thiserror::Error;
use topology::{CoreRole, Topology};

/// A broken allocator invariant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("{0} is already attached")]
    DoubleAttach(ProcessId),

    #[error("{0} is not attached")]
    NotAttached(ProcessId),

    #[error("{core} has reserved role {role:?}")]
    ReservedCore { core: CoreId, role: CoreRole },

    #[error("{0} is outside the topology")]
    CoreOutOfRange(CoreId),

    #[error("{core} expected owner {expected:?}, found {found:?}")]
    OwnershipMismatch {
        core: CoreId,
        expected: CoreOwner,
        found: CoreOwner,
    },

    #[error("{core} busy flag disagrees with owner {owner:?}")]
    BusyFlagMismatch { core: CoreId, owner: CoreOwner },

    #[error("partition broken: owned {owned} + reserved {reserved} + idle {idle} != {total}")]
    PartitionBroken {
        owned: usize,
        reserved: usize,
        idle: usize,
        total: usize,
    },

    #[error("{process} holds {owned} cores, max is {max}")]
    OverMaxCores {
        process: ProcessId,
        owned: usize,
        max: u32,
    },

    #[error("{process} reports {active} active threads, thread count is {thread_count}")]
    OverThreadCount {
        process: ProcessId,
        active: u32,
        thread_count: u32,
    },

    #[error("{process} lists {core} but the registry disagrees")]
    OwnedSetMismatch { process: ProcessId, core: CoreId },

    #[error("{process} returned {guaranteed} guaranteed cores, only {committed} committed")]
    LedgerUnderflow {
        process: ProcessId,
        guaranteed: u32,
        committed: u32,
    },
}

/// Reports a violation and aborts the control plane
pub fn fatal(violation: Violation) -> ! {
    log::error!("invariant violation: {}", violation);
    panic!("invariant violation: {}", violation);
}

/// Verifies every allocator invariant
pub fn check(
    topology: &Topology,
    registry: &CoreRegistry,
    table: &ProcessTable,
) -> Result<(), Violation> {
    let counts = registry.counts();
    if counts.total() != topology.core_count() {
        return Err(Violation::PartitionBroken {
            owned: counts.owned,
            reserved: counts.reserved,
            idle: counts.idle,
            total: topology.core_count(),
        });
    }

    for core in topology.cores() {
        let record = registry.record(core);
        let owner = record.owner();
        match (topology.role(core).is_reserved(), owner) {
            (true, CoreOwner::Reserved) | (false, CoreOwner::Unassigned) => {}
            (false, CoreOwner::Process(process)) => {
                let listed = table
                    .get(process)
                    .is_some_and(|descriptor| descriptor.owned().contains(core));
                if !listed {
                    return Err(Violation::OwnedSetMismatch { process, core });
                }
            }
            (true, found) => {
                return Err(Violation::OwnershipMismatch {
                    core,
                    expected: CoreOwner::Reserved,
                    found,
                });
            }
            (false, CoreOwner::Reserved) => {
                return Err(Violation::OwnershipMismatch {
                    core,
                    expected: CoreOwner::Unassigned,
                    found: CoreOwner::Reserved,
                });
            }
        }
        if record.is_busy() != matches!(owner, CoreOwner::Process(_)) {
            return Err(Violation::BusyFlagMismatch { core, owner });
        }
    }

    for descriptor in table.iter() {
        let process = descriptor.id();
        for core in descriptor.owned().iter() {
            if !topology.contains(core) || registry.owner(core) != CoreOwner::Process(process) {
                return Err(Violation::OwnedSetMismatch { process, core });
            }
        }
        if descriptor.owned_count() > descriptor.spec().max_cores as usize {
            return Err(Violation::OverMaxCores {
                process,
                owned: descriptor.owned_count(),
                max: descriptor.spec().max_cores,
            });
        }
        let shared = descriptor.shared();
        if shared.active_thread_count() > shared.thread_count() {
            return Err(Violation::OverThreadCount {
                process,
                active: shared.active_thread_count(),
                thread_count: shared.thread_count(),
            });
        }
    }

    Ok(())
}
