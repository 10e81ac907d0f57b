//! Allocation audit log
//!
//! Test-visible record of every attach, detach, grant, preemption, release
//! and epoch. Entries are deterministic and serializable; recording them
//! never changes an allocation decision. The log holds a fixed number of
//! entries and drops the oldest once full, so a long-running control loop
//! keeps a bounded window.

use core_types::{CoreId, ProcessId};
use resources::SchedSpec;
use sched_api::AdmissionDenial;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Entries kept by [`AllocAuditLog::new`]
pub const DEFAULT_AUDIT_CAPACITY: usize = 4096;

/// Allocation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocEvent {
    Attached {
        process: ProcessId,
        spec: SchedSpec,
    },

    AdmissionDenied {
        process: ProcessId,
        denial: AdmissionDenial,
    },

    Detached {
        process: ProcessId,
        released: usize,
    },

    /// An idle core was given to a process
    Granted { process: ProcessId, core: CoreId },

    /// A core moved directly from one owner to another
    Preempted {
        from: ProcessId,
        to: ProcessId,
        core: CoreId,
    },

    /// A core was taken back and left idle
    Released { process: ProcessId, core: CoreId },

    CongestionChanged { process: ProcessId, severity: u32 },

    EpochCompleted { epoch: u64, idle_edges: usize },
}

impl AllocEvent {
    /// Process the event concerns, if any
    pub fn process(&self) -> Option<ProcessId> {
        match self {
            AllocEvent::Attached { process, .. }
            | AllocEvent::AdmissionDenied { process, .. }
            | AllocEvent::Detached { process, .. }
            | AllocEvent::Granted { process, .. }
            | AllocEvent::Released { process, .. }
            | AllocEvent::CongestionChanged { process, .. } => Some(*process),
            AllocEvent::Preempted { to, .. } => Some(*to),
            AllocEvent::EpochCompleted { .. } => None,
        }
    }
}

/// Audit entry tagged with the epoch it happened in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocAuditEntry {
    pub epoch: u64,
    pub event: AllocEvent,
}

/// Allocation audit log
#[derive(Debug, Clone)]
pub struct AllocAuditLog {
    entries: VecDeque<AllocAuditEntry>,
    capacity: usize,
    dropped: u64,
    enabled: bool,
}

impl AllocAuditLog {
    /// Creates a new empty, enabled audit log holding
    /// [`DEFAULT_AUDIT_CAPACITY`] entries
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }

    /// Creates an enabled log that keeps at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            dropped: 0,
            enabled: capacity > 0,
        }
    }

    /// Creates a log that drops every event
    pub fn disabled() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: 0,
            dropped: 0,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries evicted to stay within capacity
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Records an event, evicting the oldest entry when full
    pub fn record(&mut self, epoch: u64, event: AllocEvent) {
        if !self.enabled {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(AllocAuditEntry { epoch, event });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> &VecDeque<AllocAuditEntry> {
        &self.entries
    }

    /// Checks if any entry matches a predicate
    pub fn has_event<F>(&self, predicate: F) -> bool
    where
        F: Fn(&AllocEvent) -> bool,
    {
        self.entries.iter().any(|entry| predicate(&entry.event))
    }

    /// Counts events matching a predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&AllocEvent) -> bool,
    {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.event))
            .count()
    }

    /// Entries concerning `process`
    pub fn entries_for_process(&self, process: ProcessId) -> Vec<&AllocAuditEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.event.process() == Some(process))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dropped = 0;
    }
}

impl Default for AllocAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log_creation() {
        let log = AllocAuditLog::new();
        assert!(log.is_empty());
        assert!(log.is_enabled());
    }

    #[test]
    fn test_disabled_log_drops_events() {
        let mut log = AllocAuditLog::disabled();
        log.record(
            0,
            AllocEvent::EpochCompleted {
                epoch: 1,
                idle_edges: 0,
            },
        );
        assert!(log.is_empty());
    }

    #[test]
    fn test_full_log_evicts_oldest() {
        let mut log = AllocAuditLog::with_capacity(3);
        for epoch in 1..=5 {
            log.record(
                epoch,
                AllocEvent::EpochCompleted {
                    epoch,
                    idle_edges: 0,
                },
            );
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.dropped(), 2);
        let epochs: Vec<u64> = log.entries().iter().map(|entry| entry.epoch).collect();
        assert_eq!(epochs, vec![3, 4, 5]);
    }

    #[test]
    fn test_zero_capacity_is_disabled() {
        let log = AllocAuditLog::with_capacity(0);
        assert!(!log.is_enabled());
    }

    #[test]
    fn test_count_events() {
        let mut log = AllocAuditLog::new();
        let pid = ProcessId::new(1);
        log.record(
            0,
            AllocEvent::Granted {
                process: pid,
                core: CoreId::new(2),
            },
        );
        log.record(
            0,
            AllocEvent::Granted {
                process: pid,
                core: CoreId::new(3),
            },
        );
        log.record(
            1,
            AllocEvent::Released {
                process: pid,
                core: CoreId::new(3),
            },
        );

        assert_eq!(
            log.count_events(|e| matches!(e, AllocEvent::Granted { .. })),
            2
        );
        assert!(log.has_event(|e| matches!(e, AllocEvent::Released { .. })));
    }

    #[test]
    fn test_entries_for_process() {
        let mut log = AllocAuditLog::new();
        log.record(
            0,
            AllocEvent::Attached {
                process: ProcessId::new(1),
                spec: SchedSpec::new(2, 1),
            },
        );
        log.record(
            0,
            AllocEvent::Preempted {
                from: ProcessId::new(1),
                to: ProcessId::new(2),
                core: CoreId::new(4),
            },
        );

        assert_eq!(log.entries_for_process(ProcessId::new(1)).len(), 1);
        assert_eq!(log.entries_for_process(ProcessId::new(2)).len(), 1);
    }

    #[test]
    fn test_entries_serialize() {
        let mut log = AllocAuditLog::new();
        log.record(
            3,
            AllocEvent::EpochCompleted {
                epoch: 3,
                idle_edges: 1,
            },
        );
        let json = serde_json::to_string(log.entries()).unwrap();
        assert!(json.contains("EpochCompleted"));
    }
}
