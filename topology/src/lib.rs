//! # Topology Snapshot
//!
//! This crate describes the cores the allocator may hand out.
//!
//! ## Philosophy
//!
//! - **Discovered once, never mutated**: hardware discovery happens at boot,
//!   outside this crate. What arrives here is an immutable value.
//! - **Shared by reference**: the registry and the policy hold the same
//!   `Arc<Topology>`; there are no free-standing globals.
//! - **Validated at construction**: a snapshot that exists is consistent.
//!
//! ## Core Concepts
//!
//! - [`CoreRole`]: General, or one of the reserved roles (dataplane, control,
//!   housekeeping). Reserved cores are never given to a process.
//! - [`Topology`]: core count, per-core role, hyperthread sibling map
//! - [`TopologyBuilder`]: explicit construction with validation
//! - [`TopologyConfig`]: serde-facing description used by configuration
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - Hardware discovery (sysfs, CPUID)
//! - NUMA modelling
//! - Hotplug

use core_types::CoreId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the number of cores a snapshot may describe
pub const MAX_CORES: usize = 256;

/// Role of a core, fixed at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreRole {
    /// Eligible for allocation to attached processes
    General,
    /// Runs the packet dataplane
    ReservedDataplane,
    /// Runs the control thread
    ReservedControl,
    /// Left to the host OS for housekeeping work
    ReservedHousekeeping,
}

impl CoreRole {
    pub fn is_reserved(&self) -> bool {
        !matches!(self, CoreRole::General)
    }
}

/// Errors raised while building a topology snapshot
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Topology must contain at least one core")]
    Empty,

    #[error("Topology has {count} cores, maximum is {max}")]
    TooManyCores { count: usize, max: usize },

    #[error("Core {core} is out of range (core count {core_count})")]
    CoreOutOfRange { core: u32, core_count: usize },

    #[error("Core {core} was given more than one reserved role")]
    RoleConflict { core: u32 },

    #[error("Core {core} cannot be its own sibling")]
    SelfSibling { core: u32 },

    #[error("Core {core} already has a different sibling")]
    SiblingConflict { core: u32 },
}

/// Immutable description of the machine's cores
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    roles: Vec<CoreRole>,
    siblings: Vec<Option<CoreId>>,
}

impl Topology {
    /// Starts building a topology with `core_count` General cores
    pub fn builder(core_count: usize) -> TopologyBuilder {
        TopologyBuilder::new(core_count)
    }

    /// Total number of cores `N`
    pub fn core_count(&self) -> usize {
        self.roles.len()
    }

    /// Returns true if `core` indexes a core of this snapshot
    pub fn contains(&self, core: CoreId) -> bool {
        core.index() < self.roles.len()
    }

    /// Role of `core`
    ///
    /// # Panics
    ///
    /// Panics if `core` is out of range.
    pub fn role(&self, core: CoreId) -> CoreRole {
        self.roles[core.index()]
    }

    /// Hyperthread partner of `core`, if it has one
    pub fn sibling(&self, core: CoreId) -> Option<CoreId> {
        self.siblings.get(core.index()).copied().flatten()
    }

    pub fn is_general(&self, core: CoreId) -> bool {
        self.contains(core) && self.role(core) == CoreRole::General
    }

    /// Every General core, ascending
    pub fn general_cores(&self) -> impl Iterator<Item = CoreId> + '_ {
        self.cores().filter(|core| self.role(*core) == CoreRole::General)
    }

    pub fn general_count(&self) -> usize {
        self.roles
            .iter()
            .filter(|role| **role == CoreRole::General)
            .count()
    }

    pub fn reserved_count(&self) -> usize {
        self.core_count() - self.general_count()
    }

    /// Every core, ascending
    pub fn cores(&self) -> impl Iterator<Item = CoreId> {
        (0..self.roles.len() as u32).map(CoreId::new)
    }

    pub fn dataplane_core(&self) -> Option<CoreId> {
        self.first_with_role(CoreRole::ReservedDataplane)
    }

    pub fn control_core(&self) -> Option<CoreId> {
        self.first_with_role(CoreRole::ReservedControl)
    }

    pub fn housekeeping_core(&self) -> Option<CoreId> {
        self.first_with_role(CoreRole::ReservedHousekeeping)
    }

    fn first_with_role(&self, role: CoreRole) -> Option<CoreId> {
        self.cores().find(|core| self.role(*core) == role)
    }
}

/// Builder for [`Topology`]
///
/// Requests are recorded as given and checked together in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    core_count: usize,
    reservations: Vec<(u32, CoreRole)>,
    pairs: Vec<(u32, u32)>,
}

impl TopologyBuilder {
    pub fn new(core_count: usize) -> Self {
        Self {
            core_count,
            reservations: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Builder: assigns a reserved role to `core`
    ///
    /// Passing [`CoreRole::General`] is accepted and has no effect.
    pub fn reserve(mut self, core: u32, role: CoreRole) -> Self {
        self.reservations.push((core, role));
        self
    }

    /// Builder: declares `a` and `b` hyperthread siblings
    pub fn siblings(mut self, a: u32, b: u32) -> Self {
        self.pairs.push((a, b));
        self
    }

    /// Builder: pairs cores `(0,1), (2,3), ...`
    pub fn adjacent_siblings(mut self) -> Self {
        let mut core = 0u32;
        while (core as usize) + 1 < self.core_count {
            self.pairs.push((core, core + 1));
            core += 2;
        }
        self
    }

    pub fn build(self) -> Result<Topology, TopologyError> {
        let TopologyBuilder {
            core_count,
            reservations,
            pairs,
        } = self;
        if core_count == 0 {
            return Err(TopologyError::Empty);
        }
        if core_count > MAX_CORES {
            return Err(TopologyError::TooManyCores {
                count: core_count,
                max: MAX_CORES,
            });
        }

        let mut roles = vec![CoreRole::General; core_count];
        for (core, role) in reservations {
            check_range(core, core_count)?;
            if !role.is_reserved() {
                continue;
            }
            let slot = &mut roles[core as usize];
            if slot.is_reserved() && *slot != role {
                return Err(TopologyError::RoleConflict { core });
            }
            *slot = role;
        }

        let mut siblings: Vec<Option<CoreId>> = vec![None; core_count];
        for (a, b) in pairs {
            check_range(a, core_count)?;
            check_range(b, core_count)?;
            if a == b {
                return Err(TopologyError::SelfSibling { core: a });
            }
            for (core, partner) in [(a, b), (b, a)] {
                match siblings[core as usize] {
                    Some(existing) if existing != CoreId::new(partner) => {
                        return Err(TopologyError::SiblingConflict { core });
                    }
                    _ => siblings[core as usize] = Some(CoreId::new(partner)),
                }
            }
        }

        Ok(Topology { roles, siblings })
    }
}

fn check_range(core: u32, core_count: usize) -> Result<(), TopologyError> {
    if (core as usize) < core_count {
        Ok(())
    } else {
        Err(TopologyError::CoreOutOfRange { core, core_count })
    }
}

/// Serialized form of a topology snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub core_count: usize,
    #[serde(default)]
    pub dataplane_core: Option<u32>,
    #[serde(default)]
    pub control_core: Option<u32>,
    #[serde(default)]
    pub housekeeping_core: Option<u32>,
    /// Explicit sibling pairs; ignored when `adjacent_siblings` is set
    #[serde(default)]
    pub sibling_pairs: Vec<[u32; 2]>,
    #[serde(default)]
    pub adjacent_siblings: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            core_count: 8,
            dataplane_core: Some(0),
            control_core: Some(1),
            housekeeping_core: None,
            sibling_pairs: Vec::new(),
            adjacent_siblings: false,
        }
    }
}

impl TopologyConfig {
    pub fn build(&self) -> Result<Topology, TopologyError> {
        let mut builder = TopologyBuilder::new(self.core_count);
        let reserved = [
            (self.dataplane_core, CoreRole::ReservedDataplane),
            (self.control_core, CoreRole::ReservedControl),
            (self.housekeeping_core, CoreRole::ReservedHousekeeping),
        ];
        for (core, role) in reserved {
            if let Some(core) = core {
                builder = builder.reserve(core, role);
            }
        }
        if self.adjacent_siblings {
            builder = builder.adjacent_siblings();
        } else {
            for [a, b] in &self.sibling_pairs {
                builder = builder.siblings(*a, *b);
            }
        }
        builder.build()
    }
}
