//! Epoch driver
//!
//! One epoch: sample every process's shared congestion bits, deliver the
//! ones that changed to the policy, drain the idle-edge set, let the policy
//! reconcile, then close the epoch.

use congestion::CongestionSnapshot;
use core_alloc::Allocator;
use core_types::ProcessId;
use policy::SchedPolicy;
use sched_api::EpochReport;
use std::time::{Duration, Instant};

/// Paces epochs and runs the reconciliation
#[derive(Debug, Clone)]
pub struct EpochDriver {
    interval: Duration,
    last_epoch: Option<Instant>,
}

impl EpochDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_epoch: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when an epoch should run at `now`
    ///
    /// The first call is always due.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_epoch {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Runs one epoch regardless of pacing
    pub fn reconcile(
        &mut self,
        alloc: &mut Allocator,
        policy: &mut dyn SchedPolicy,
        now: Instant,
    ) -> EpochReport {
        self.last_epoch = Some(now);
        let before = alloc.stats();

        let processes: Vec<ProcessId> = alloc.processes().ids().collect();
        let mut congestion_changes = 0;
        for process in processes {
            let snapshot = alloc.sample_congestion(process);
            if deliver_congestion(alloc, policy, process, snapshot) {
                congestion_changes += 1;
            }
        }

        let idle_edges = alloc.take_idle_edges();
        policy.on_epoch(alloc, &idle_edges);

        let after = alloc.stats();
        let preempted = after.preempted - before.preempted;
        let epoch = alloc.complete_epoch(idle_edges.len());
        let report = EpochReport {
            epoch,
            congestion_changes,
            idle_edges,
            granted: (after.granted - before.granted + preempted) as usize,
            reclaimed: (after.released - before.released + preempted) as usize,
        };
        log::debug!(
            "epoch {}: {} congestion changes, {} idle edges, {} granted, {} reclaimed",
            report.epoch,
            report.congestion_changes,
            report.idle_edges.len(),
            report.granted,
            report.reclaimed
        );
        report
    }
}

/// Stores `snapshot` and hands it to the policy if it differs from what was
/// last delivered for `process`
///
/// Returns true when it was delivered.
pub fn deliver_congestion(
    alloc: &mut Allocator,
    policy: &mut dyn SchedPolicy,
    process: ProcessId,
    snapshot: CongestionSnapshot,
) -> bool {
    if !alloc.update_congestion(process, snapshot) {
        return false;
    }
    let delivered = alloc.descriptor(process).congestion().clone();
    policy.on_congestion_changed(alloc, process, &delivered);
    true
}
