//! # Scheduler API
//!
//! This crate defines the interface between the control thread and the core
//! allocator.
//!
//! ## Philosophy
//!
//! The allocator provides **mechanisms**, the active policy decides:
//! - Admission (attach/detach)
//! - Single-core fast path (`add_core`)
//! - Explicit placement (`assign_core`)
//! - Bulk reconciliation once per epoch (`poll_epoch`)
//!
//! ## Design Goals
//!
//! 1. **Single writer**: every method takes `&mut self`; the one control
//!    thread that owns the implementation is the only caller.
//! 2. **Ordinary failures are values**: admission denial and a missing core
//!    are [`SchedError`] results.
//! 3. **Corruption is fatal**: invariant violations abort instead of returning.
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A process launcher
//! - A transport for the attach handshake

pub mod api;
pub mod error;

pub use api::{EpochReport, ProcessHandle, SchedApi};
pub use error::{AdmissionDenial, NoCoreReason, SchedError};
