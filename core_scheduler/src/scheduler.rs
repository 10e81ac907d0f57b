//! Control-thread scheduler

use crate::config::{ConfigError, SchedConfig};
use crate::driver::{deliver_congestion, EpochDriver};
use congestion::{CongestionBits, CongestionSnapshot};
use core_alloc::invariant::fatal;
use core_alloc::{AllocAuditLog, Allocator, ExecutionRuntime, Violation};
use core_types::{CoreId, CoreSet, ProcessId};
use policy::SchedPolicy;
use resources::SchedSpec;
use sched_api::{EpochReport, ProcessHandle, SchedApi, SchedError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use topology::Topology;

/// The core allocation engine
///
/// Owns the allocator and the single policy chosen at construction. All
/// methods take `&mut self`; the control thread that owns the scheduler is
/// the only caller.
pub struct CoreScheduler {
    alloc: Allocator,
    policy: Box<dyn SchedPolicy>,
    driver: EpochDriver,
}

impl CoreScheduler {
    /// Creates a scheduler with the default epoch length, invariant checks
    /// and audit enabled
    pub fn new(
        topology: Arc<Topology>,
        policy: Box<dyn SchedPolicy>,
        runtime: Box<dyn ExecutionRuntime>,
    ) -> Self {
        let defaults = SchedConfig::default();
        Self {
            alloc: Allocator::new(topology, runtime),
            policy,
            driver: EpochDriver::new(defaults.epoch_interval()),
        }
    }

    /// Builds the topology, allocator and policy described by `config`
    pub fn from_config(
        config: &SchedConfig,
        runtime: Box<dyn ExecutionRuntime>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let topology = Arc::new(config.topology.build()?);
        let audit = if config.audit {
            AllocAuditLog::with_capacity(config.audit_capacity)
        } else {
            AllocAuditLog::disabled()
        };
        let alloc = Allocator::new(topology, runtime)
            .with_audit(audit)
            .with_invariant_checks(config.check_invariants);
        Ok(Self {
            alloc,
            policy: config.policy.build(),
            driver: EpochDriver::new(config.epoch_interval()),
        })
    }

    /// Builder: sets the epoch length
    pub fn with_epoch_interval(mut self, interval: Duration) -> Self {
        self.driver = EpochDriver::new(interval);
        self
    }

    pub fn allocator(&self) -> &Allocator {
        &self.alloc
    }

    pub fn topology(&self) -> &Arc<Topology> {
        self.alloc.topology()
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Returns a reference to the allocation audit log
    pub fn audit(&self) -> &AllocAuditLog {
        self.alloc.audit()
    }

    /// Runs an epoch if one is due at `now`
    pub fn poll(&mut self, now: Instant) -> Option<EpochReport> {
        if !self.driver.is_due(now) {
            return None;
        }
        Some(
            self.driver
                .reconcile(&mut self.alloc, self.policy.as_mut(), now),
        )
    }

    /// Runs paced epochs until `stop` is set
    ///
    /// Returns the number of epochs run.
    pub fn run(&mut self, stop: &AtomicBool) -> u64 {
        log::info!(
            "core scheduler running {} every {:?}",
            self.policy.name(),
            self.driver.interval()
        );
        let mut epochs = 0;
        while !stop.load(Ordering::Relaxed) {
            if self.poll(Instant::now()).is_some() {
                epochs += 1;
            } else {
                std::hint::spin_loop();
            }
        }
        log::info!("core scheduler stopped after {} epochs", epochs);
        epochs
    }
}

impl SchedApi for CoreScheduler {
    fn poll_epoch(&mut self) -> EpochReport {
        self.driver
            .reconcile(&mut self.alloc, self.policy.as_mut(), Instant::now())
    }

    fn add_core(&mut self, process: ProcessId) -> Result<CoreId, SchedError> {
        let result = self.policy.on_core_needed(&mut self.alloc, process);
        if let Err(err) = &result {
            log::debug!("{}", err);
        }
        result
    }

    fn attach_process(
        &mut self,
        process: ProcessId,
        spec: SchedSpec,
    ) -> Result<ProcessHandle, SchedError> {
        if let Err(denial) = self.alloc.check_admission(process, &spec) {
            return Err(self.alloc.deny(process, denial));
        }
        if let Err(denial) = self.policy.on_attach(&self.alloc, process, &spec) {
            return Err(self.alloc.deny(process, denial));
        }
        match self.alloc.register(process, spec) {
            Ok(shared) => Ok(ProcessHandle::new(process, shared)),
            Err(denial) => Err(self.alloc.deny(process, denial)),
        }
    }

    fn detach_process(&mut self, process: ProcessId) {
        if self.alloc.process(process).is_none() {
            fatal(Violation::NotAttached(process));
        }
        self.policy.on_detach(&mut self.alloc, process);
        self.alloc.unregister(process);
    }

    fn assign_core(&mut self, process: ProcessId, core: CoreId) -> Result<(), SchedError> {
        self.alloc.assign_core(process, core)
    }

    fn notify_congested(&mut self, process: ProcessId, threads: CongestionBits, io: CongestionBits) {
        // Bits beyond the process's thread count are dropped by the publish
        let shared = self.alloc.descriptor(process).shared();
        shared.publish(&CongestionSnapshot::new(threads, io));
        let snapshot = shared.snapshot();
        deliver_congestion(&mut self.alloc, self.policy.as_mut(), process, snapshot);
    }

    fn process_cores(&self, process: ProcessId) -> Option<CoreSet> {
        self.alloc
            .process(process)
            .map(|descriptor| descriptor.owned().clone())
    }

    fn epoch(&self) -> u64 {
        self.alloc.epoch()
    }
}
