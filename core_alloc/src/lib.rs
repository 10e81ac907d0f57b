//! # Core Allocator
//!
//! This crate owns the mutable state of core allocation: which process holds
//! which core, and the per-process bookkeeping behind it.
//!
//! ## Purpose
//!
//! - [`CoreRegistry`]: one record per core (role, owner, busy flag)
//! - [`ProcessTable`]: one descriptor per attached process
//! - [`Allocator`]: the primitives (`grant_core`, `assign_core`,
//!   `release_core`, `release_all`) that mutate both tables together
//! - [`ExecutionRuntime`]: the collaborator that starts and preempts
//!   execution contexts on cores
//! - [`invariant`]: the checks behind every observable state
//!
//! ## Philosophy
//!
//! **A corrupted ownership table is worse than a crash.**
//!
//! Granting one core to two processes is a silent correctness failure.
//! Anything that would lead there (double attach, detaching a stranger,
//! touching a reserved core, a table that no longer adds up) aborts via
//! [`invariant::fatal`].
//!
//! Everything here runs on the single control thread. There is no internal
//! locking; `&mut` access is the exclusion mechanism.

pub mod allocator;
pub mod audit;
pub mod invariant;
pub mod process_table;
pub mod registry;
pub mod runtime;
pub mod test_utils;

pub use allocator::{AllocStats, Allocator};
pub use audit::{AllocAuditEntry, AllocAuditLog, AllocEvent, DEFAULT_AUDIT_CAPACITY};
pub use invariant::Violation;
pub use process_table::{ProcessDescriptor, ProcessTable};
pub use registry::{CoreOwner, CoreRecord, CoreRegistry, RegistryCounts};
pub use runtime::{ExecutionRuntime, NullRuntime};
