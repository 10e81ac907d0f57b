//! Allocation primitives
//!
//! [`Allocator`] is the only type that mutates the [`CoreRegistry`] and the
//! [`ProcessTable`], and it always mutates them together. Each primitive
//! leaves both tables consistent before it returns; with invariant checks
//! enabled, that is verified after every primitive.

use crate::audit::{AllocAuditLog, AllocEvent};
use crate::invariant::{self, fatal, Violation};
use crate::process_table::{ProcessDescriptor, ProcessTable};
use crate::registry::{CoreOwner, CoreRegistry};
use crate::runtime::ExecutionRuntime;
use congestion::{CongestionSnapshot, SharedProcState};
use core_types::{CoreId, CoreSet, ProcessId};
use resources::{GuaranteeLedger, SchedSpec};
use sched_api::{AdmissionDenial, NoCoreReason, SchedError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use topology::Topology;

/// Running totals of core movements since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocStats {
    /// Idle cores handed to a process
    pub granted: u64,
    /// Cores moved directly from one owner to another
    pub preempted: u64,
    /// Cores taken back and left idle
    pub released: u64,
}

/// Registry, descriptor table and the primitives over them
pub struct Allocator {
    topology: Arc<Topology>,
    registry: CoreRegistry,
    table: ProcessTable,
    ledger: GuaranteeLedger,
    runtime: Box<dyn ExecutionRuntime>,
    audit: AllocAuditLog,
    stats: AllocStats,
    epoch: u64,
    check_invariants: bool,
}

impl Allocator {
    pub fn new(topology: Arc<Topology>, runtime: Box<dyn ExecutionRuntime>) -> Self {
        let registry = CoreRegistry::new(&topology);
        let ledger = GuaranteeLedger::new(topology.general_count() as u32);
        Self {
            topology,
            registry,
            table: ProcessTable::new(),
            ledger,
            runtime,
            audit: AllocAuditLog::new(),
            stats: AllocStats::default(),
            epoch: 0,
            check_invariants: true,
        }
    }

    /// Builder: replaces the audit log
    pub fn with_audit(mut self, audit: AllocAuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Builder: enables or disables the per-primitive invariant check
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn registry(&self) -> &CoreRegistry {
        &self.registry
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.table
    }

    pub fn process(&self, process: ProcessId) -> Option<&ProcessDescriptor> {
        self.table.get(process)
    }

    /// Descriptor of an attached process; a stranger is fatal
    pub fn descriptor(&self, process: ProcessId) -> &ProcessDescriptor {
        match self.table.get(process) {
            Some(descriptor) => descriptor,
            None => fatal(Violation::NotAttached(process)),
        }
    }

    pub fn audit(&self) -> &AllocAuditLog {
        &self.audit
    }

    pub fn stats(&self) -> AllocStats {
        self.stats
    }

    pub fn ledger(&self) -> &GuaranteeLedger {
        &self.ledger
    }

    /// Current epoch number
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // ========================================================================
    // Admission
    // ========================================================================

    /// Checks whether `spec` can be admitted, without mutating anything
    ///
    /// Attaching an identity that is already attached is fatal.
    pub fn check_admission(
        &self,
        process: ProcessId,
        spec: &SchedSpec,
    ) -> Result<(), AdmissionDenial> {
        if self.table.contains(process) {
            fatal(Violation::DoubleAttach(process));
        }
        spec.validate(self.topology.general_count() as u32)?;
        if !self.ledger.can_admit(spec.guaranteed_cores) {
            return Err(AdmissionDenial::GuaranteeUnavailable {
                requested: spec.guaranteed_cores,
                uncommitted: self.ledger.uncommitted(),
            });
        }
        Ok(())
    }

    /// Records a refused attach and turns it into the caller's error
    pub fn deny(&mut self, process: ProcessId, denial: AdmissionDenial) -> SchedError {
        log::warn!("admission denied for {}: {}", process, denial);
        self.audit.record(
            self.epoch,
            AllocEvent::AdmissionDenied {
                process,
                denial: denial.clone(),
            },
        );
        SchedError::AdmissionDenied { process, denial }
    }

    /// Admits and registers `process`
    ///
    /// Re-runs [`check_admission`](Self::check_admission), commits the
    /// guarantee and inserts a descriptor with zero owned cores. Returns the
    /// region shared with the process's runtime.
    pub fn register(
        &mut self,
        process: ProcessId,
        spec: SchedSpec,
    ) -> Result<Arc<SharedProcState>, AdmissionDenial> {
        self.check_admission(process, &spec)?;
        self.ledger.commit(spec.guaranteed_cores);

        let shared = Arc::new(SharedProcState::new(spec.thread_count));
        self.table.insert(ProcessDescriptor::new(
            process,
            spec,
            Arc::clone(&shared),
            self.epoch,
        ));
        log::info!("attached {} with {}", process, spec);
        self.audit
            .record(self.epoch, AllocEvent::Attached { process, spec });
        self.assert_invariants();
        Ok(shared)
    }

    /// Releases every core of `process` and removes its descriptor
    ///
    /// Returns the cores that were released. A stranger is fatal.
    pub fn unregister(&mut self, process: ProcessId) -> CoreSet {
        let released = self.release_all(process);
        let descriptor = match self.table.remove(process) {
            Some(descriptor) => descriptor,
            None => fatal(Violation::NotAttached(process)),
        };
        let guaranteed = descriptor.spec().guaranteed_cores;
        if !self.ledger.release(guaranteed) {
            fatal(Violation::LedgerUnderflow {
                process,
                guaranteed,
                committed: self.ledger.committed(),
            });
        }
        log::info!("detached {}, released {} cores", process, released.len());
        self.audit.record(
            self.epoch,
            AllocEvent::Detached {
                process,
                released: released.len(),
            },
        );
        self.assert_invariants();
        released
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Picks the idle General core `process` would receive
    ///
    /// Preference: idle sibling of an owned core, then the first idle core in
    /// `hint`, then the lowest-id idle core.
    pub fn select_idle_core(&self, process: ProcessId, hint: Option<&CoreSet>) -> Option<CoreId> {
        let descriptor = self.descriptor(process);
        let sibling = descriptor
            .owned()
            .iter()
            .filter_map(|core| self.topology.sibling(core))
            .find(|sibling| self.registry.is_idle(*sibling));
        if sibling.is_some() {
            return sibling;
        }

        let hinted = hint.and_then(|hint| {
            hint.iter()
                .find(|core| self.topology.contains(*core) && self.registry.is_idle(*core))
        });
        if hinted.is_some() {
            return hinted;
        }

        self.registry.idle_cores().next()
    }

    /// Why `process` cannot take one more core, if it cannot
    fn capacity_check(&self, process: ProcessId) -> Result<(), NoCoreReason> {
        let descriptor = self.descriptor(process);
        if descriptor.at_max_cores() {
            return Err(NoCoreReason::AtMaxCores);
        }
        if descriptor.threads_exhausted() {
            return Err(NoCoreReason::NoThreadAvailable);
        }
        Ok(())
    }

    /// Grants one idle General core to `process`
    ///
    /// Fails with `NoCoreAvailable` and no side effects if the process is at
    /// `max_cores`, has no execution context left to run, or no core is idle.
    pub fn grant_core(&mut self, process: ProcessId) -> Result<CoreId, SchedError> {
        self.grant(process, None)
    }

    /// Like [`grant_core`](Self::grant_core), preferring cores in `hint`
    /// after siblings
    pub fn grant_core_hinted(
        &mut self,
        process: ProcessId,
        hint: &CoreSet,
    ) -> Result<CoreId, SchedError> {
        self.grant(process, Some(hint))
    }

    fn grant(&mut self, process: ProcessId, hint: Option<&CoreSet>) -> Result<CoreId, SchedError> {
        self.capacity_check(process)
            .map_err(|reason| SchedError::NoCoreAvailable { process, reason })?;
        let core = self
            .select_idle_core(process, hint)
            .ok_or(SchedError::NoCoreAvailable {
                process,
                reason: NoCoreReason::NoIdleCore,
            })?;

        self.take_ownership(process, core);
        self.stats.granted += 1;
        log::debug!("granted {} to {}", core, process);
        self.audit
            .record(self.epoch, AllocEvent::Granted { process, core });
        self.runtime.run_on_core(process, core);
        self.assert_invariants();
        Ok(core)
    }

    /// Places `process` on `core`, preempting the current owner first
    ///
    /// Blocks only while the previous owner's context reaches its safe
    /// point. Targeting a reserved core is fatal. Assigning a core the
    /// process already owns succeeds without doing anything. When the
    /// process cannot take another core, nothing is preempted.
    pub fn assign_core(&mut self, process: ProcessId, core: CoreId) -> Result<(), SchedError> {
        if !self.topology.contains(core) {
            fatal(Violation::CoreOutOfRange(core));
        }
        let role = self.topology.role(core);
        if role.is_reserved() {
            fatal(Violation::ReservedCore { core, role });
        }

        let owner = self.registry.owner(core);
        if owner == CoreOwner::Process(process) {
            return Ok(());
        }
        self.capacity_check(process)
            .map_err(|reason| SchedError::NoCoreAvailable { process, reason })?;

        match owner {
            CoreOwner::Process(previous) => {
                self.runtime.preempt(previous, core);
                self.drop_ownership(previous, core);
                self.take_ownership(process, core);
                self.stats.preempted += 1;
                log::debug!("preempted {} from {} for {}", core, previous, process);
                self.audit.record(
                    self.epoch,
                    AllocEvent::Preempted {
                        from: previous,
                        to: process,
                        core,
                    },
                );
            }
            CoreOwner::Unassigned => {
                self.take_ownership(process, core);
                self.stats.granted += 1;
                log::debug!("assigned {} to {}", core, process);
                self.audit
                    .record(self.epoch, AllocEvent::Granted { process, core });
            }
            CoreOwner::Reserved => fatal(Violation::ReservedCore { core, role }),
        }

        self.runtime.run_on_core(process, core);
        self.assert_invariants();
        Ok(())
    }

    /// Takes `core` back from `process` and leaves it idle
    ///
    /// The owner's context is preempted first. A core the process does not
    /// own is fatal.
    pub fn release_core(&mut self, process: ProcessId, core: CoreId) {
        if self.registry.owner(core) != CoreOwner::Process(process) {
            fatal(Violation::OwnedSetMismatch { process, core });
        }
        self.runtime.preempt(process, core);
        self.drop_ownership(process, core);
        self.stats.released += 1;
        log::debug!("released {} from {}", core, process);
        self.audit
            .record(self.epoch, AllocEvent::Released { process, core });
        self.assert_invariants();
    }

    /// Moves every core `process` owns back to idle
    ///
    /// Used on teardown: the process's contexts are already gone, so no
    /// safe-point wait happens. There is no partial failure; an owned set that
    /// disagrees with the registry is fatal.
    pub fn release_all(&mut self, process: ProcessId) -> CoreSet {
        let cores = match self.table.get_mut(process) {
            Some(descriptor) => descriptor.take_cores(),
            None => fatal(Violation::NotAttached(process)),
        };
        for core in cores.iter() {
            self.registry.set_idle(core, process);
            self.audit
                .record(self.epoch, AllocEvent::Released { process, core });
        }
        cores
    }

    fn take_ownership(&mut self, process: ProcessId, core: CoreId) {
        self.registry.set_owner(core, process);
        match self.table.get_mut(process) {
            Some(descriptor) => descriptor.add_core(core),
            None => fatal(Violation::NotAttached(process)),
        }
    }

    fn drop_ownership(&mut self, process: ProcessId, core: CoreId) {
        let listed = self
            .table
            .get_mut(process)
            .is_some_and(|descriptor| descriptor.remove_core(core));
        if !listed {
            fatal(Violation::OwnedSetMismatch { process, core });
        }
        self.registry.set_idle(core, process);
    }

    // ========================================================================
    // Congestion and epochs
    // ========================================================================

    /// Reads the runtime's current congestion bits for `process`
    pub fn sample_congestion(&self, process: ProcessId) -> CongestionSnapshot {
        self.descriptor(process).shared().snapshot()
    }

    /// Stores `snapshot` as the last delivered congestion of `process`
    ///
    /// Returns false, and changes nothing, when it matches what was last
    /// delivered.
    pub fn update_congestion(&mut self, process: ProcessId, snapshot: CongestionSnapshot) -> bool {
        let epoch = self.epoch;
        let descriptor = match self.table.get_mut(process) {
            Some(descriptor) => descriptor,
            None => fatal(Violation::NotAttached(process)),
        };
        if descriptor.congestion() == &snapshot {
            return false;
        }
        let severity = snapshot.severity();
        descriptor.set_congestion(snapshot);
        self.audit
            .record(epoch, AllocEvent::CongestionChanged { process, severity });
        true
    }

    /// Drains the set of cores that became idle since the last call
    pub fn take_idle_edges(&mut self) -> CoreSet {
        self.registry.take_idle_edges()
    }

    /// Closes the current epoch and returns the new epoch number
    pub fn complete_epoch(&mut self, idle_edges: usize) -> u64 {
        self.epoch += 1;
        self.audit.record(
            self.epoch,
            AllocEvent::EpochCompleted {
                epoch: self.epoch,
                idle_edges,
            },
        );
        self.assert_invariants();
        self.epoch
    }

    /// Verifies every invariant
    pub fn check_invariants(&self) -> Result<(), Violation> {
        invariant::check(&self.topology, &self.registry, &self.table)
    }

    /// Verifies every invariant if checks are enabled; a failure is fatal
    pub fn assert_invariants(&self) {
        if !self.check_invariants {
            return;
        }
        if let Err(violation) = self.check_invariants() {
            fatal(violation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{scenario_topology, RecordingRuntime, RuntimeCall};
    use crate::NullRuntime;
    use topology::CoreRole;

    fn allocator() -> Allocator {
        Allocator::new(Arc::new(scenario_topology()), Box::new(NullRuntime))
    }

    fn attach(alloc: &mut Allocator, raw: u64, spec: SchedSpec) -> ProcessId {
        let pid = ProcessId::new(raw);
        alloc.register(pid, spec).unwrap();
        pid
    }

    #[test]
    fn test_register_starts_with_no_cores() {
        let mut alloc = allocator();
        let pid = attach(&mut alloc, 1, SchedSpec::new(4, 2));
        assert_eq!(alloc.descriptor(pid).owned_count(), 0);
        assert_eq!(alloc.ledger().committed(), 2);
        assert_eq!(alloc.registry().idle_count(), 6);
    }

    #[test]
    #[should_panic(expected = "returned 2 guaranteed cores, only 0 committed")]
    fn test_unregister_with_drifted_ledger_is_fatal() {
        let mut alloc = allocator();
        let pid = attach(&mut alloc, 1, SchedSpec::new(4, 2));
        alloc.ledger = GuaranteeLedger::new(6);
        alloc.unregister(pid);
    }

    #[test]
    fn test_admission_exact_fit_then_denied() {
        let mut alloc = allocator();
        attach(&mut alloc, 1, SchedSpec::new(4, 2));
        attach(&mut alloc, 2, SchedSpec::new(4, 4));

        let denial = alloc
            .check_admission(ProcessId::new(3), &SchedSpec::new(1, 1))
            .unwrap_err();
        assert_eq!(
            denial,
            AdmissionDenial::GuaranteeUnavailable {
                requested: 1,
                uncommitted: 0
            }
        );
    }

    #[test]
    fn test_malformed_spec_denied() {
        let alloc = allocator();
        let denial = alloc
            .check_admission(ProcessId::new(1), &SchedSpec::new(2, 3))
            .unwrap_err();
        assert!(matches!(denial, AdmissionDenial::MalformedSpec(_)));
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_double_attach_is_fatal() {
        let mut alloc = allocator();
        attach(&mut alloc, 1, SchedSpec::new(2, 0));
        let _ = alloc.check_admission(ProcessId::new(1), &SchedSpec::new(2, 0));
    }

    #[test]
    fn test_grant_prefers_lowest_idle_core() {
        let mut alloc = allocator();
        let pid = attach(&mut alloc, 1, SchedSpec::new(4, 0));
        assert_eq!(alloc.grant_core(pid), Ok(CoreId::new(2)));
        assert_eq!(
            alloc.registry().owner(CoreId::new(2)),
            CoreOwner::Process(pid)
        );
    }

    #[test]
    fn test_grant_prefers_sibling_of_owned() {
        let topology = Topology::builder(8)
            .reserve(0, CoreRole::ReservedDataplane)
            .reserve(1, CoreRole::ReservedControl)
            .siblings(2, 6)
            .build()
            .unwrap();
        let mut alloc = Allocator::new(Arc::new(topology), Box::new(NullRuntime));
        let pid = attach(&mut alloc, 1, SchedSpec::new(4, 0));

        assert_eq!(alloc.grant_core(pid), Ok(CoreId::new(2)));
        assert_eq!(alloc.grant_core(pid), Ok(CoreId::new(6)));
        assert_eq!(alloc.grant_core(pid), Ok(CoreId::new(3)));
    }

    #[test]
    fn test_grant_uses_hint_after_siblings() {
        let mut alloc = allocator();
        let pid = attach(&mut alloc, 1, SchedSpec::new(4, 0));
        let hint = CoreSet::from_indices([5]);
        assert_eq!(alloc.grant_core_hinted(pid, &hint), Ok(CoreId::new(5)));
    }

    #[test]
    fn test_grant_at_max_fails_without_side_effects() {
        let mut alloc = allocator();
        let pid = attach(&mut alloc, 1, SchedSpec::new(1, 0));
        alloc.grant_core(pid).unwrap();

        let before = alloc.registry().clone();
        let result = alloc.grant_core(pid);
        assert_eq!(
            result,
            Err(SchedError::NoCoreAvailable {
                process: pid,
                reason: NoCoreReason::AtMaxCores
            })
        );
        assert_eq!(alloc.registry(), &before);
    }

    #[test]
    fn test_grant_limited_by_thread_count() {
        let mut alloc = allocator();
        let pid = attach(&mut alloc, 1, SchedSpec::new(4, 0).with_thread_count(1));
        alloc.grant_core(pid).unwrap();
        assert_eq!(
            alloc.grant_core(pid),
            Err(SchedError::NoCoreAvailable {
                process: pid,
                reason: NoCoreReason::NoThreadAvailable
            })
        );
    }

    #[test]
    fn test_grant_with_no_idle_core() {
        let mut alloc = allocator();
        let a = attach(&mut alloc, 1, SchedSpec::new(6, 0));
        for _ in 0..6 {
            alloc.grant_core(a).unwrap();
        }
        let b = attach(&mut alloc, 2, SchedSpec::new(1, 0));
        assert_eq!(
            alloc.grant_core(b),
            Err(SchedError::NoCoreAvailable {
                process: b,
                reason: NoCoreReason::NoIdleCore
            })
        );
    }

    #[test]
    fn test_assign_preempts_previous_owner() {
        let runtime = RecordingRuntime::new();
        let calls = runtime.calls();
        let mut alloc = Allocator::new(Arc::new(scenario_topology()), Box::new(runtime));
        let p = attach(&mut alloc, 1, SchedSpec::new(2, 0));
        let q = attach(&mut alloc, 2, SchedSpec::new(2, 0));
        let core = alloc.grant_core(p).unwrap();

        alloc.assign_core(q, core).unwrap();
        assert_eq!(alloc.stats().preempted, 1);

        assert!(!alloc.descriptor(p).owned().contains(core));
        assert!(alloc.descriptor(q).owned().contains(core));
        assert_eq!(alloc.registry().owner(core), CoreOwner::Process(q));
        assert!(alloc.registry().idle_edges().is_empty());

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                RuntimeCall::Run(p, core),
                RuntimeCall::Preempt(p, core),
                RuntimeCall::Run(q, core),
            ]
        );
    }

    #[test]
    fn test_assign_own_core_is_noop() {
        let mut alloc = allocator();
        let p = attach(&mut alloc, 1, SchedSpec::new(1, 0));
        let core = alloc.grant_core(p).unwrap();
        let audit_len = alloc.audit().len();
        assert_eq!(alloc.assign_core(p, core), Ok(()));
        assert_eq!(alloc.audit().len(), audit_len);
    }

    #[test]
    fn test_assign_at_max_does_not_preempt() {
        let mut alloc = allocator();
        let p = attach(&mut alloc, 1, SchedSpec::new(1, 0));
        let q = attach(&mut alloc, 2, SchedSpec::new(1, 0));
        let core = alloc.grant_core(p).unwrap();
        alloc.grant_core(q).unwrap();

        let result = alloc.assign_core(q, core);
        assert!(result.unwrap_err().is_no_core_available());
        assert_eq!(alloc.registry().owner(core), CoreOwner::Process(p));
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_assign_reserved_core_is_fatal() {
        let mut alloc = allocator();
        let p = attach(&mut alloc, 1, SchedSpec::new(1, 0));
        let _ = alloc.assign_core(p, CoreId::new(0));
    }

    #[test]
    fn test_release_core_records_idle_edge() {
        let mut alloc = allocator();
        let p = attach(&mut alloc, 1, SchedSpec::new(2, 0));
        let core = alloc.grant_core(p).unwrap();
        alloc.release_core(p, core);
        assert!(alloc.registry().is_idle(core));
        assert_eq!(alloc.take_idle_edges(), CoreSet::from_iter([core]));
    }

    #[test]
    fn test_unregister_releases_everything() {
        let mut alloc = allocator();
        let p = attach(&mut alloc, 1, SchedSpec::new(3, 1));
        alloc.grant_core(p).unwrap();
        alloc.grant_core(p).unwrap();

        let released = alloc.unregister(p);
        assert_eq!(released.len(), 2);
        for core in released.iter() {
            assert!(alloc.registry().is_idle(core));
        }
        assert!(alloc.process(p).is_none());
        assert_eq!(alloc.ledger().committed(), 0);
        assert_eq!(alloc.registry().idle_count(), 6);
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn test_unregister_stranger_is_fatal() {
        let mut alloc = allocator();
        alloc.unregister(ProcessId::new(42));
    }

    #[test]
    fn test_update_congestion_only_on_change() {
        let mut alloc = allocator();
        let p = attach(&mut alloc, 1, SchedSpec::new(2, 0));
        let shared = Arc::clone(alloc.descriptor(p).shared());

        assert!(!alloc.update_congestion(p, alloc.sample_congestion(p)));
        shared.mark_thread_congested(0);
        assert!(alloc.update_congestion(p, alloc.sample_congestion(p)));
        assert!(!alloc.update_congestion(p, alloc.sample_congestion(p)));
        assert_eq!(alloc.descriptor(p).congestion().severity(), 1);
    }

    #[test]
    fn test_complete_epoch_increments() {
        let mut alloc = allocator();
        assert_eq!(alloc.complete_epoch(0), 1);
        assert_eq!(alloc.complete_epoch(0), 2);
        assert_eq!(alloc.epoch(), 2);
    }

    #[test]
    fn test_invariants_hold_after_mixed_operations() {
        let mut alloc = allocator();
        let a = attach(&mut alloc, 1, SchedSpec::new(3, 1));
        let b = attach(&mut alloc, 2, SchedSpec::new(3, 1));
        let core = alloc.grant_core(a).unwrap();
        alloc.grant_core(b).unwrap();
        alloc.assign_core(b, core).unwrap();
        alloc.unregister(a);
        assert_eq!(alloc.check_invariants(), Ok(()));
        let counts = alloc.registry().counts();
        assert_eq!(counts.owned, 2);
        assert_eq!(counts.total(), 8);
    }

    #[test]
    fn test_over_thread_count_detected() {
        let mut alloc = allocator().with_invariant_checks(false);
        let p = attach(&mut alloc, 1, SchedSpec::new(2, 0));
        alloc.descriptor(p).shared().set_active_threads(3);
        assert!(matches!(
            alloc.check_invariants(),
            Err(Violation::OverThreadCount { .. })
        ));
    }
}
