//! State shared between a runtime process and the allocator.

use crate::bitmap::{AtomicBitmap, CongestionBits};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Thread and I/O congestion sampled together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CongestionSnapshot {
    pub threads: CongestionBits,
    pub io: CongestionBits,
}

impl CongestionSnapshot {
    pub fn new(threads: CongestionBits, io: CongestionBits) -> Self {
        Self { threads, io }
    }

    /// Uncongested snapshot for `width` execution contexts
    pub fn empty(width: usize) -> Self {
        Self {
            threads: CongestionBits::empty(width),
            io: CongestionBits::empty(width),
        }
    }

    /// Number of congested slots across both bitmaps
    pub fn severity(&self) -> u32 {
        self.threads.count() + self.io.count()
    }

    pub fn is_congested(&self) -> bool {
        !self.threads.is_empty() || !self.io.is_empty()
    }
}

/// Region a runtime process shares with the allocator
///
/// The runtime owns `active_thread_count` and both bitmaps; the allocator
/// only reads them. Every access is a relaxed atomic.
#[derive(Debug)]
pub struct SharedProcState {
    thread_count: u32,
    active_thread_count: AtomicU32,
    threads: AtomicBitmap,
    io: AtomicBitmap,
}

impl SharedProcState {
    pub fn new(thread_count: u32) -> Self {
        Self {
            thread_count,
            active_thread_count: AtomicU32::new(0),
            threads: AtomicBitmap::new(thread_count as usize),
            io: AtomicBitmap::new(thread_count as usize),
        }
    }

    /// Maximum concurrently schedulable execution contexts
    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    /// Execution contexts currently running
    pub fn active_thread_count(&self) -> u32 {
        self.active_thread_count.load(Ordering::Relaxed)
    }

    /// Execution contexts parked and available to wake
    pub fn threads_avail(&self) -> u32 {
        self.thread_count.saturating_sub(self.active_thread_count())
    }

    // Producer side: called by the runtime's execution contexts.

    pub fn set_active_threads(&self, active: u32) {
        self.active_thread_count.store(active, Ordering::Relaxed);
    }

    pub fn mark_thread_congested(&self, slot: usize) {
        self.threads.set(slot);
    }

    pub fn clear_thread_congested(&self, slot: usize) {
        self.threads.clear(slot);
    }

    pub fn mark_io_congested(&self, slot: usize) {
        self.io.set(slot);
    }

    pub fn clear_io_congested(&self, slot: usize) {
        self.io.clear(slot);
    }

    /// Overwrites both bitmaps with `snapshot`
    ///
    /// For congestion reported through the control API instead of written by
    /// the execution contexts themselves.
    pub fn publish(&self, snapshot: &CongestionSnapshot) {
        for slot in 0..self.thread_count as usize {
            if snapshot.threads.test(slot) {
                self.threads.set(slot);
            } else {
                self.threads.clear(slot);
            }
            if snapshot.io.test(slot) {
                self.io.set(slot);
            } else {
                self.io.clear(slot);
            }
        }
    }

    // Consumer side: control thread only.

    pub fn snapshot(&self) -> CongestionSnapshot {
        CongestionSnapshot {
            threads: self.threads.snapshot(),
            io: self.io.snapshot(),
        }
    }
}
