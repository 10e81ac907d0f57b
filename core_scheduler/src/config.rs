//! Scheduler configuration

use core_alloc::DEFAULT_AUDIT_CAPACITY;
use policy::PolicyKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use topology::{TopologyConfig, TopologyError};

/// Default epoch length in microseconds
pub const DEFAULT_EPOCH_US: u64 = 10;

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(String),

    #[error("Epoch length must be non-zero")]
    ZeroEpoch,

    #[error("Audit capacity must be non-zero when audit is enabled")]
    ZeroAuditCapacity,

    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),
}

/// Everything needed to build a [`CoreScheduler`](crate::CoreScheduler)
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedConfig {
    /// Epoch length in microseconds
    pub epoch_us: u64,
    /// Verify every invariant after each allocation primitive
    pub check_invariants: bool,
    /// Keep the allocation audit log
    pub audit: bool,
    /// Entries the audit log retains before evicting the oldest
    pub audit_capacity: usize,
    pub policy: PolicyKind,
    pub topology: TopologyConfig,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            epoch_us: DEFAULT_EPOCH_US,
            check_invariants: true,
            audit: true,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            policy: PolicyKind::default(),
            topology: TopologyConfig::default(),
        }
    }
}

impl SchedConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SchedConfig =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.epoch_us == 0 {
            return Err(ConfigError::ZeroEpoch);
        }
        if self.audit && self.audit_capacity == 0 {
            return Err(ConfigError::ZeroAuditCapacity);
        }
        self.topology.build()?;
        Ok(())
    }

    pub fn epoch_interval(&self) -> Duration {
        Duration::from_micros(self.epoch_us)
    }
}
