//! # Congestion Channel
//!
//! This crate holds the per-process state that a runtime's execution contexts
//! write concurrently and the control thread samples once per epoch.
//!
//! ## Philosophy
//!
//! - **Hints, not truth**: a set bit means "recently congested". Readers must
//!   tolerate values up to one epoch stale.
//! - **No locks on the producer side**: every write is a relaxed atomic bit
//!   operation. Adding synchronization here would change latency, not
//!   correctness.
//! - **Single reader**: only the control thread takes snapshots.
//!
//! ## Core Concepts
//!
//! - [`AtomicBitmap`]: fixed-width, relaxed set/clear/test
//! - [`CongestionBits`]: plain snapshot of one bitmap
//! - [`CongestionSnapshot`]: thread and I/O bitmaps sampled together
//! - [`SharedProcState`]: the region shared between a runtime and the allocator

pub mod bitmap;
pub mod shared;

pub use bitmap::{AtomicBitmap, CongestionBits};
pub use shared::{CongestionSnapshot, SharedProcState};
