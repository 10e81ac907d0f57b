//! # Core Types
//!
//! This crate defines the identifiers shared by every layer of the core
//! allocator.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: a core index and a process identity are
//!   distinct types and cannot be confused.
//! - **Deterministic ordering**: every set iterates in ascending id order so
//!   that allocation decisions are reproducible under test.
//!
//! ## Key Types
//!
//! - [`ProcessId`]: Identity of an attached runtime process
//! - [`CoreId`]: Index of a physical/logical CPU core
//! - [`CoreSet`]: Ordered set of cores (owned sets, idle edges)

pub mod core_set;
pub mod ids;

pub use core_set::CoreSet;
pub use ids::{CoreId, ProcessId};
