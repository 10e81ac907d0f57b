//! Congestion-driven reference policy
//!
//! Each epoch, in order:
//! 1. every uncongested process holding cores above its guarantee gives one
//!    back (the highest-id core it owns)
//! 2. congested processes, most urgent first, each receive at most one idle
//!    General core (idle sibling of an owned core, then a core from the
//!    epoch's idle edges, then the lowest-id idle core)
//! 3. a congested process still below its guarantee with no idle core left
//!    takes one burst core from the least congested donor
//!
//! Urgency is congestion severity (congested slots across both bitmaps),
//! then spec priority, then the lowest process id.

use crate::SchedPolicy;
use congestion::CongestionSnapshot;
use core_alloc::{Allocator, ProcessDescriptor};
use core_types::{CoreId, CoreSet, ProcessId};
use sched_api::{NoCoreReason, SchedError};
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

/// Reference policy: grow congested processes, shrink idle ones
#[derive(Debug, Clone, Default)]
pub struct DefaultPolicy {
    /// Last delivered severity per process; absent means zero
    severity: BTreeMap<ProcessId, u32>,
}

impl DefaultPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Severity last delivered for `process`
    pub fn severity(&self, process: ProcessId) -> u32 {
        self.severity.get(&process).copied().unwrap_or(0)
    }

    /// Congested, attached processes, most urgent first
    pub fn ranked_congested(&self, alloc: &Allocator) -> Vec<ProcessId> {
        let mut ranked: Vec<&ProcessDescriptor> = alloc
            .processes()
            .iter()
            .filter(|descriptor| self.severity(descriptor.id()) > 0)
            .collect();
        ranked.sort_by(|a, b| self.urgency(a, b));
        ranked.into_iter().map(|descriptor| descriptor.id()).collect()
    }

    fn urgency(&self, a: &ProcessDescriptor, b: &ProcessDescriptor) -> Ordering {
        self.severity(b.id())
            .cmp(&self.severity(a.id()))
            .then(b.spec().priority.cmp(&a.spec().priority))
            .then(a.id().cmp(&b.id()))
    }

    /// Process that should give up a burst core to `recipient`, with the core
    ///
    /// Least congested first, then lowest priority, then highest id.
    fn pick_donor(&self, alloc: &Allocator, recipient: ProcessId) -> Option<(ProcessId, CoreId)> {
        alloc
            .processes()
            .iter()
            .filter(|descriptor| descriptor.id() != recipient && descriptor.burst_count() > 0)
            .min_by_key(|descriptor| {
                (
                    self.severity(descriptor.id()),
                    descriptor.spec().priority,
                    Reverse(descriptor.id()),
                )
            })
            .and_then(|descriptor| descriptor.owned().last().map(|core| (descriptor.id(), core)))
    }

    fn reclaim_uncongested(&self, alloc: &mut Allocator) -> usize {
        let reclaim: Vec<(ProcessId, CoreId)> = alloc
            .processes()
            .iter()
            .filter(|descriptor| self.severity(descriptor.id()) == 0 && descriptor.burst_count() > 0)
            .filter_map(|descriptor| descriptor.owned().last().map(|core| (descriptor.id(), core)))
            .collect();
        for (process, core) in &reclaim {
            alloc.release_core(*process, *core);
        }
        reclaim.len()
    }

    fn grant_idle(&self, alloc: &mut Allocator, ranked: &[ProcessId], idle_edges: &CoreSet) -> usize {
        let mut granted = 0;
        for process in ranked {
            if alloc.registry().idle_count() == 0 {
                break;
            }
            match alloc.grant_core_hinted(*process, idle_edges) {
                Ok(_) => granted += 1,
                Err(err) => log::trace!("{}: {}", self.name(), err),
            }
        }
        granted
    }

    fn preempt_for_guarantees(&self, alloc: &mut Allocator, ranked: &[ProcessId]) -> usize {
        let mut preempted = 0;
        for process in ranked {
            if alloc.registry().idle_count() > 0 {
                break;
            }
            let descriptor = alloc.descriptor(*process);
            if descriptor.guarantee_deficit() == 0 || descriptor.threads_exhausted() {
                continue;
            }
            if let Some((donor, core)) = self.pick_donor(alloc, *process) {
                log::debug!(
                    "{}: {} below guarantee, taking {} from {}",
                    self.name(),
                    process,
                    core,
                    donor
                );
                if alloc.assign_core(*process, core).is_ok() {
                    preempted += 1;
                }
            }
        }
        preempted
    }
}

impl SchedPolicy for DefaultPolicy {
    fn name(&self) -> &str {
        "DefaultPolicy"
    }

    fn on_detach(&mut self, _alloc: &mut Allocator, process: ProcessId) {
        self.severity.remove(&process);
    }

    fn on_congestion_changed(
        &mut self,
        _alloc: &mut Allocator,
        process: ProcessId,
        snapshot: &CongestionSnapshot,
    ) {
        let severity = snapshot.severity();
        if severity == 0 {
            self.severity.remove(&process);
        } else {
            self.severity.insert(process, severity);
        }
    }

    fn on_core_needed(
        &mut self,
        alloc: &mut Allocator,
        process: ProcessId,
    ) -> Result<CoreId, SchedError> {
        match alloc.grant_core(process) {
            Err(
                err @ SchedError::NoCoreAvailable {
                    reason: NoCoreReason::NoIdleCore,
                    ..
                },
            ) if alloc.descriptor(process).guarantee_deficit() > 0 => {
                let (_, core) = self.pick_donor(alloc, process).ok_or(err)?;
                alloc.assign_core(process, core)?;
                Ok(core)
            }
            result => result,
        }
    }

    fn on_epoch(&mut self, alloc: &mut Allocator, idle_edges: &CoreSet) {
        let reclaimed = self.reclaim_uncongested(alloc);
        let ranked = self.ranked_congested(alloc);
        let granted = self.grant_idle(alloc, &ranked, idle_edges);
        let preempted = self.preempt_for_guarantees(alloc, &ranked);
        if reclaimed + granted + preempted > 0 {
            log::debug!(
                "{}: epoch {} reclaimed {} granted {} preempted {}",
                self.name(),
                alloc.epoch(),
                reclaimed,
                granted,
                preempted
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_alloc::test_utils::scenario_topology;
    use core_alloc::{CoreOwner, NullRuntime};
    use resources::SchedSpec;
    use std::sync::Arc;

    fn allocator() -> Allocator {
        Allocator::new(Arc::new(scenario_topology()), Box::new(NullRuntime))
    }

    fn attach(alloc: &mut Allocator, raw: u64, spec: SchedSpec) -> ProcessId {
        let pid = ProcessId::new(raw);
        alloc.register(pid, spec).unwrap();
        pid
    }

    /// Marks `slots` congested and delivers the change like the epoch driver
    fn congest(policy: &mut DefaultPolicy, alloc: &mut Allocator, pid: ProcessId, slots: &[usize]) {
        let shared = Arc::clone(alloc.descriptor(pid).shared());
        for slot in slots {
            shared.mark_thread_congested(*slot);
        }
        let snapshot = shared.snapshot();
        if alloc.update_congestion(pid, snapshot.clone()) {
            policy.on_congestion_changed(alloc, pid, &snapshot);
        }
    }

    fn owner(alloc: &Allocator, core: u32) -> CoreOwner {
        alloc.registry().owner(CoreId::new(core))
    }

    #[test]
    fn test_more_congested_process_wins_last_idle_core() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let x = attach(&mut alloc, 1, SchedSpec::new(4, 0));
        let y = attach(&mut alloc, 2, SchedSpec::new(4, 0));
        let filler = attach(&mut alloc, 3, SchedSpec::new(3, 3));
        alloc.assign_core(x, CoreId::new(2)).unwrap();
        alloc.assign_core(y, CoreId::new(3)).unwrap();
        for core in [4, 6, 7] {
            alloc.assign_core(filler, CoreId::new(core)).unwrap();
        }

        congest(&mut policy, &mut alloc, y, &[0]);
        congest(&mut policy, &mut alloc, x, &[0, 1, 2]);
        policy.on_epoch(&mut alloc, &CoreSet::from_indices([5]));

        assert_eq!(owner(&alloc, 5), CoreOwner::Process(x));
        assert_eq!(alloc.descriptor(y).owned_count(), 1);
    }

    #[test]
    fn test_equal_severity_lowest_id_wins() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(4, 0));
        let b = attach(&mut alloc, 2, SchedSpec::new(4, 0));
        let filler = attach(&mut alloc, 3, SchedSpec::new(5, 5));
        for _ in 0..5 {
            alloc.grant_core(filler).unwrap();
        }

        congest(&mut policy, &mut alloc, b, &[1]);
        congest(&mut policy, &mut alloc, a, &[1]);
        policy.on_epoch(&mut alloc, &CoreSet::new());

        assert_eq!(alloc.descriptor(a).owned_count(), 1);
        assert_eq!(alloc.descriptor(b).owned_count(), 0);
    }

    #[test]
    fn test_priority_breaks_severity_tie() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let low = attach(&mut alloc, 1, SchedSpec::new(4, 0));
        let high = attach(&mut alloc, 2, SchedSpec::new(4, 0).with_priority(5));
        congest(&mut policy, &mut alloc, low, &[0]);
        congest(&mut policy, &mut alloc, high, &[0]);

        assert_eq!(policy.ranked_congested(&alloc), vec![high, low]);
    }

    #[test]
    fn test_each_congested_process_gets_one_core_per_epoch() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(4, 0));
        let b = attach(&mut alloc, 2, SchedSpec::new(4, 0));
        congest(&mut policy, &mut alloc, a, &[0, 1]);
        congest(&mut policy, &mut alloc, b, &[0]);

        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(alloc.descriptor(a).owned_count(), 1);
        assert_eq!(alloc.descriptor(b).owned_count(), 1);

        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(alloc.descriptor(a).owned_count(), 2);
        assert_eq!(alloc.descriptor(b).owned_count(), 2);
    }

    #[test]
    fn test_grant_prefers_idle_edge() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(4, 0));
        congest(&mut policy, &mut alloc, a, &[0]);

        policy.on_epoch(&mut alloc, &CoreSet::from_indices([6]));
        assert_eq!(owner(&alloc, 6), CoreOwner::Process(a));
    }

    #[test]
    fn test_grant_stops_at_max_cores() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(1, 0));
        congest(&mut policy, &mut alloc, a, &[0]);

        policy.on_epoch(&mut alloc, &CoreSet::new());
        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(alloc.descriptor(a).owned_count(), 1);
    }

    #[test]
    fn test_uncongested_reclaimed_toward_guarantee() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(4, 2));
        for _ in 0..4 {
            alloc.grant_core(a).unwrap();
        }

        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(alloc.descriptor(a).owned_count(), 3);
        assert!(alloc.registry().is_idle(CoreId::new(5)));

        policy.on_epoch(&mut alloc, &CoreSet::new());
        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(alloc.descriptor(a).owned_count(), 2);
    }

    #[test]
    fn test_congested_process_not_reclaimed() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(2, 0));
        alloc.grant_core(a).unwrap();
        alloc.grant_core(a).unwrap();
        congest(&mut policy, &mut alloc, a, &[0]);

        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(alloc.descriptor(a).owned_count(), 2);
    }

    #[test]
    fn test_reserved_cores_untouched() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(6, 0));
        congest(&mut policy, &mut alloc, a, &[0]);
        for _ in 0..8 {
            policy.on_epoch(&mut alloc, &CoreSet::new());
        }
        assert_eq!(alloc.descriptor(a).owned_count(), 6);
        assert_eq!(owner(&alloc, 0), CoreOwner::Reserved);
        assert_eq!(owner(&alloc, 1), CoreOwner::Reserved);
    }

    #[test]
    fn test_guarantee_deficit_preempts_burst_core() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let hog = attach(&mut alloc, 1, SchedSpec::new(6, 0));
        for _ in 0..6 {
            alloc.grant_core(hog).unwrap();
        }
        let needy = attach(&mut alloc, 2, SchedSpec::new(2, 2));
        congest(&mut policy, &mut alloc, hog, &[0]);
        congest(&mut policy, &mut alloc, needy, &[0, 1]);

        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(owner(&alloc, 7), CoreOwner::Process(needy));
        assert_eq!(alloc.descriptor(hog).owned_count(), 5);

        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(alloc.descriptor(needy).owned_count(), 2);

        // guarantee met: no further preemption
        policy.on_epoch(&mut alloc, &CoreSet::new());
        assert_eq!(alloc.descriptor(needy).owned_count(), 2);
        assert_eq!(alloc.descriptor(hog).owned_count(), 4);
    }

    #[test]
    fn test_core_needed_grants_idle_core() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(2, 0));
        assert_eq!(policy.on_core_needed(&mut alloc, a), Ok(CoreId::new(2)));
    }

    #[test]
    fn test_core_needed_at_max_has_no_side_effects() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(1, 0));
        policy.on_core_needed(&mut alloc, a).unwrap();

        let registry = alloc.registry().clone();
        let stats = alloc.stats();
        let err = policy.on_core_needed(&mut alloc, a).unwrap_err();
        assert_eq!(
            err,
            SchedError::NoCoreAvailable {
                process: a,
                reason: NoCoreReason::AtMaxCores
            }
        );
        assert_eq!(alloc.registry(), &registry);
        assert_eq!(alloc.stats(), stats);
    }

    #[test]
    fn test_core_needed_below_guarantee_preempts() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let hog = attach(&mut alloc, 1, SchedSpec::new(6, 0));
        for _ in 0..6 {
            alloc.grant_core(hog).unwrap();
        }
        let needy = attach(&mut alloc, 2, SchedSpec::new(1, 1));

        assert_eq!(policy.on_core_needed(&mut alloc, needy), Ok(CoreId::new(7)));
        assert_eq!(alloc.stats().preempted, 1);
    }

    #[test]
    fn test_core_needed_above_guarantee_does_not_preempt() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let hog = attach(&mut alloc, 1, SchedSpec::new(6, 0));
        for _ in 0..6 {
            alloc.grant_core(hog).unwrap();
        }
        let other = attach(&mut alloc, 2, SchedSpec::new(2, 0));

        let err = policy.on_core_needed(&mut alloc, other).unwrap_err();
        assert!(err.is_no_core_available());
        assert_eq!(alloc.descriptor(hog).owned_count(), 6);
    }

    #[test]
    fn test_detach_forgets_severity() {
        let mut alloc = allocator();
        let mut policy = DefaultPolicy::new();
        let a = attach(&mut alloc, 1, SchedSpec::new(2, 0));
        congest(&mut policy, &mut alloc, a, &[0]);
        assert_eq!(policy.severity(a), 1);

        policy.on_detach(&mut alloc, a);
        alloc.unregister(a);
        assert_eq!(policy.severity(a), 0);
        assert!(policy.ranked_congested(&alloc).is_empty());
    }
}
