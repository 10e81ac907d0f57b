//! Scheduler error types

use core_types::ProcessId;
use resources::SpecError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recoverable errors returned to the immediate caller
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedError {
    /// Attach refused; the launch subsystem must refuse the process slot
    #[error("Admission denied for {process}: {denial}")]
    AdmissionDenied {
        process: ProcessId,
        denial: AdmissionDenial,
    },

    /// No core could be granted right now; retry or wait for the next epoch
    #[error("No core available for {process}: {reason}")]
    NoCoreAvailable {
        process: ProcessId,
        reason: NoCoreReason,
    },
}

impl SchedError {
    pub fn is_admission_denied(&self) -> bool {
        matches!(self, SchedError::AdmissionDenied { .. })
    }

    pub fn is_no_core_available(&self) -> bool {
        matches!(self, SchedError::NoCoreAvailable { .. })
    }
}

/// Why an attach was refused
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionDenial {
    #[error("malformed spec: {0}")]
    MalformedSpec(#[from] SpecError),

    #[error("{requested} guaranteed cores requested, {uncommitted} uncommitted")]
    GuaranteeUnavailable { requested: u32, uncommitted: u32 },

    #[error("policy refused: {0}")]
    PolicyRefused(String),
}

/// Why a grant failed
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoCoreReason {
    #[error("process already holds max_cores")]
    AtMaxCores,

    #[error("every execution context is already running")]
    NoThreadAvailable,

    #[error("no idle General core")]
    NoIdleCore,

    #[error("policy declined the request")]
    PolicyDeclined,
}
