//! # Resources
//!
//! This crate provides the resource spec a process presents at attach time
//! and the admission arithmetic the registry applies to it.
//!
//! ## Philosophy
//!
//! - **Resources are finite and must be explicit**: a process states how many
//!   cores it may ever hold and how many must stay reservable for it.
//! - **Guarantees are enforced, not advisory**: admission refuses a spec whose
//!   guarantee cannot be honoured alongside everyone else's.
//! - **Priority is opaque here**: only policies interpret it.
//!
//! ## Core Concepts
//!
//! - [`SchedSpec`]: `max_cores`, `guaranteed_cores`, `priority`, `thread_count`
//! - [`SpecError`]: why a spec is malformed
//! - [`GuaranteeLedger`]: running sum of guarantees against the General pool
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - Memory or bandwidth accounting
//! - Time-sliced CPU budgets

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum execution contexts per process (one congestion bit each)
pub const MAX_THREADS: u32 = 64;

/// Scheduling spec requested by a process at attach time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedSpec {
    /// Upper bound on cores the process may ever hold
    pub max_cores: u32,
    /// Cores that must remain reservable for the process
    pub guaranteed_cores: u32,
    /// Policy-defined weight, higher is more important
    #[serde(default)]
    pub priority: u32,
    /// Maximum concurrently schedulable execution contexts
    pub thread_count: u32,
}

impl SchedSpec {
    /// Creates a spec with one execution context per allowed core
    pub fn new(max_cores: u32, guaranteed_cores: u32) -> Self {
        Self {
            max_cores,
            guaranteed_cores,
            priority: 0,
            thread_count: max_cores,
        }
    }

    /// Builder: sets the priority
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Builder: sets the execution context count
    pub fn with_thread_count(mut self, thread_count: u32) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Checks the spec against the number of General cores on the machine
    pub fn validate(&self, general_cores: u32) -> Result<(), SpecError> {
        if self.guaranteed_cores > self.max_cores {
            return Err(SpecError::GuaranteeExceedsMax {
                guaranteed: self.guaranteed_cores,
                max: self.max_cores,
            });
        }
        if self.max_cores > general_cores {
            return Err(SpecError::MaxExceedsGeneral {
                max: self.max_cores,
                general: general_cores,
            });
        }
        if self.thread_count == 0 || self.thread_count > MAX_THREADS {
            return Err(SpecError::ThreadCount {
                requested: self.thread_count,
                limit: MAX_THREADS,
            });
        }
        Ok(())
    }

    /// Cores this process may hold that are not covered by its guarantee
    pub fn burst_cores(&self) -> u32 {
        self.max_cores.saturating_sub(self.guaranteed_cores)
    }
}

impl fmt::Display for SchedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SchedSpec[max={}, guaranteed={}, priority={}, threads={}]",
            self.max_cores, self.guaranteed_cores, self.priority, self.thread_count
        )
    }
}

/// Malformed spec
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecError {
    #[error("guaranteed cores ({guaranteed}) exceed max cores ({max})")]
    GuaranteeExceedsMax { guaranteed: u32, max: u32 },

    #[error("max cores ({max}) exceed the {general} General cores available")]
    MaxExceedsGeneral { max: u32, general: u32 },

    #[error("thread count {requested} outside 1..={limit}")]
    ThreadCount { requested: u32, limit: u32 },
}

/// Running sum of guarantees against the General pool
///
/// Admission succeeds iff the sum of every attached guarantee plus the new
/// one stays within the General core count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteeLedger {
    general_cores: u32,
    committed: u32,
}

impl GuaranteeLedger {
    pub fn new(general_cores: u32) -> Self {
        Self {
            general_cores,
            committed: 0,
        }
    }

    pub fn committed(&self) -> u32 {
        self.committed
    }

    /// General cores not promised to anyone
    pub fn uncommitted(&self) -> u32 {
        self.general_cores - self.committed
    }

    pub fn can_admit(&self, guaranteed: u32) -> bool {
        self.committed
            .checked_add(guaranteed)
            .is_some_and(|total| total <= self.general_cores)
    }

    /// Records a guarantee, returning false (and changing nothing) if it
    /// does not fit
    pub fn commit(&mut self, guaranteed: u32) -> bool {
        if !self.can_admit(guaranteed) {
            return false;
        }
        self.committed += guaranteed;
        true
    }

    /// Returns a guarantee to the pool, returning false (and changing
    /// nothing) if more is released than was committed
    pub fn release(&mut self, guaranteed: u32) -> bool {
        match self.committed.checked_sub(guaranteed) {
            Some(remaining) => {
                self.committed = remaining;
                true
            }
            None => false,
        }
    }
}
