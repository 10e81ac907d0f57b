//! # Core Allocation Policies
//!
//! This crate provides pluggable allocation policies for the core allocator.
//!
//! ## Philosophy
//!
//! - **Mechanism not policy**: the allocator provides primitives, policies
//!   decide who gets which core and when
//! - **Policy decides; it does not own**: every change goes through an
//!   [`Allocator`] primitive, so invariants hold whatever the policy does
//! - **Deterministic**: same state and same notifications give the same
//!   decisions, so every policy is testable without a clock
//! - **Chosen once**: exactly one policy is injected at construction and is
//!   never swapped while running
//!
//! ## Core Concepts
//!
//! - [`SchedPolicy`]: entry points called by the control thread
//! - [`DefaultPolicy`]: congestion-driven reference policy
//! - [`StaticPolicy`]: guarantee-only allocation
//! - [`PolicyKind`]: configuration-level policy selector
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A time-sliced CPU scheduler
//! - A fairness or SLO engine
//! - A way to reconfigure the running policy

pub mod default_policy;
pub mod static_policy;

pub use default_policy::DefaultPolicy;
pub use static_policy::StaticPolicy;

use congestion::CongestionSnapshot;
use core_alloc::Allocator;
use core_types::{CoreId, CoreSet, ProcessId};
use resources::SchedSpec;
use sched_api::{AdmissionDenial, SchedError};
use serde::{Deserialize, Serialize};

/// Allocation policy
///
/// Every entry point runs on the control thread with exclusive access to the
/// allocator. Fatal conditions (unknown process, reserved core) are raised
/// by the allocator itself.
pub trait SchedPolicy: Send {
    /// Returns the name of this policy (for logging/audit)
    fn name(&self) -> &str;

    /// Called after the registry's admission check passed and before the
    /// process is registered
    ///
    /// Refusing leaves nothing mutated.
    fn on_attach(
        &mut self,
        _alloc: &Allocator,
        _process: ProcessId,
        _spec: &SchedSpec,
    ) -> Result<(), AdmissionDenial> {
        Ok(())
    }

    /// Called before the process's cores are released and its descriptor
    /// dropped
    fn on_detach(&mut self, _alloc: &mut Allocator, _process: ProcessId) {}

    /// Called when a process's congestion differs from what was last
    /// delivered
    ///
    /// Must not grant or release cores; that happens in
    /// [`on_epoch`](Self::on_epoch).
    fn on_congestion_changed(
        &mut self,
        _alloc: &mut Allocator,
        _process: ProcessId,
        _snapshot: &CongestionSnapshot,
    ) {
    }

    /// Synchronous single-core request
    ///
    /// Must fail with no side effects when no core can be given.
    fn on_core_needed(&mut self, alloc: &mut Allocator, process: ProcessId)
        -> Result<CoreId, SchedError>;

    /// Once per epoch, after every congestion change of the epoch was
    /// delivered
    ///
    /// `idle_edges` holds the cores that became idle since the previous
    /// epoch and are still idle.
    fn on_epoch(&mut self, alloc: &mut Allocator, idle_edges: &CoreSet);
}

/// Policy selector for configuration files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Default,
    Static,
}

impl PolicyKind {
    /// Builds a fresh instance of the selected policy
    pub fn build(self) -> Box<dyn SchedPolicy> {
        match self {
            PolicyKind::Default => Box::new(DefaultPolicy::new()),
            PolicyKind::Static => Box::new(StaticPolicy::new()),
        }
    }
}
