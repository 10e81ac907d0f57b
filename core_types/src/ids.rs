//! Unique identifiers for system entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an attached runtime process
///
/// Handed in by the launch subsystem and stable for the attached lifetime.
/// Ordering is meaningful: policies break true ties in favour of the lowest id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(u64);

impl ProcessId {
    /// Creates a process ID from a raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Process({})", self.0)
    }
}

/// Index of a CPU core managed by the registry
///
/// Valid indices are `0..core_count` of the topology snapshot in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoreId(pub u32);

impl CoreId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index as a `usize` for table lookups
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Core({})", self.0)
    }
}
