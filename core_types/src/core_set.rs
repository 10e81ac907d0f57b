//! Ordered set of cores

use crate::CoreId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of cores
///
/// Used for a process's owned cores and for the edge-triggered set of cores
/// that became idle during an epoch. Iteration is always ascending by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreSet {
    cores: BTreeSet<CoreId>,
}

impl CoreSet {
    /// Creates a new empty core set
    pub fn new() -> Self {
        Self {
            cores: BTreeSet::new(),
        }
    }

    /// Creates a core set from raw indices
    pub fn from_indices(indices: impl IntoIterator<Item = u32>) -> Self {
        Self {
            cores: indices.into_iter().map(CoreId::new).collect(),
        }
    }

    /// Inserts a core, returning true if it was not already present
    pub fn insert(&mut self, core: CoreId) -> bool {
        self.cores.insert(core)
    }

    /// Removes a core, returning true if it was present
    pub fn remove(&mut self, core: CoreId) -> bool {
        self.cores.remove(&core)
    }

    pub fn contains(&self, core: CoreId) -> bool {
        self.cores.contains(&core)
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Lowest core in the set
    pub fn first(&self) -> Option<CoreId> {
        self.cores.first().copied()
    }

    /// Highest core in the set
    pub fn last(&self) -> Option<CoreId> {
        self.cores.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = CoreId> + '_ {
        self.cores.iter().copied()
    }

    /// Moves every core out, leaving the set empty
    pub fn take(&mut self) -> CoreSet {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.cores.clear();
    }
}

impl FromIterator<CoreId> for CoreSet {
    fn from_iter<I: IntoIterator<Item = CoreId>>(iter: I) -> Self {
        Self {
            cores: iter.into_iter().collect(),
        }
    }
}

impl Extend<CoreId> for CoreSet {
    fn extend<I: IntoIterator<Item = CoreId>>(&mut self, iter: I) {
        self.cores.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_set_ascending_iteration() {
        let set = CoreSet::from_indices([5, 1, 3]);
        let order: Vec<u32> = set.iter().map(|c| c.0).collect();
        assert_eq!(order, vec![1, 3, 5]);
        assert_eq!(set.first(), Some(CoreId::new(1)));
        assert_eq!(set.last(), Some(CoreId::new(5)));
    }

    #[test]
    fn test_core_set_insert_remove() {
        let mut set = CoreSet::new();
        assert!(set.insert(CoreId::new(2)));
        assert!(!set.insert(CoreId::new(2)));
        assert!(set.contains(CoreId::new(2)));
        assert!(set.remove(CoreId::new(2)));
        assert!(!set.remove(CoreId::new(2)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_core_set_take_leaves_empty() {
        let mut set = CoreSet::from_indices([0, 4]);
        let taken = set.take();
        assert_eq!(taken.len(), 2);
        assert!(set.is_empty());
    }
}
