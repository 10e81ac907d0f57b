//! # Core Scheduler
//!
//! This crate ties the allocator, the active policy and the epoch driver
//! together behind [`SchedApi`](sched_api::SchedApi).
//!
//! ## Philosophy
//!
//! - **One control thread**: [`CoreScheduler`] is owned by the thread that
//!   polls it; exclusivity comes from `&mut self`, not locks
//! - **Policy injected once**: the policy is fixed at construction
//! - **Configuration is data**: [`SchedConfig`] is plain serde, with defaults
//!   for every field
//!
//! ## Example
//!
//! ```
//! use core_alloc::NullRuntime;
//! use core_scheduler::{CoreScheduler, SchedConfig};
//! use core_types::ProcessId;
//! use resources::SchedSpec;
//! use sched_api::SchedApi;
//!
//! let config = SchedConfig::default();
//! let mut sched = CoreScheduler::from_config(&config, Box::new(NullRuntime)).unwrap();
//! let handle = sched.attach_process(ProcessId::new(1), SchedSpec::new(4, 2)).unwrap();
//! handle.shared.mark_thread_congested(0);
//! let report = sched.poll_epoch();
//! assert_eq!(report.granted, 1);
//! ```
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A process launcher or attach transport
//! - A log backend; binaries install their own `log` implementation

pub mod config;
pub mod driver;
pub mod scheduler;

pub use config::{ConfigError, SchedConfig, DEFAULT_EPOCH_US};
pub use driver::{deliver_congestion, EpochDriver};
pub use scheduler::CoreScheduler;
