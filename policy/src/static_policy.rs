//! Guarantee-only policy
//!
//! Every process runs on exactly its guaranteed cores. Specs with burst
//! capacity are refused at attach, congestion is ignored and nothing is ever
//! reclaimed or preempted.

use crate::SchedPolicy;
use core_alloc::Allocator;
use core_types::{CoreId, CoreSet, ProcessId};
use resources::SchedSpec;
use sched_api::{AdmissionDenial, NoCoreReason, SchedError};

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPolicy;

impl StaticPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl SchedPolicy for StaticPolicy {
    fn name(&self) -> &str {
        "StaticPolicy"
    }

    fn on_attach(
        &mut self,
        _alloc: &Allocator,
        _process: ProcessId,
        spec: &SchedSpec,
    ) -> Result<(), AdmissionDenial> {
        if spec.burst_cores() > 0 {
            return Err(AdmissionDenial::PolicyRefused(format!(
                "static allocation needs max_cores == guaranteed_cores, got {}",
                spec
            )));
        }
        Ok(())
    }

    fn on_core_needed(
        &mut self,
        alloc: &mut Allocator,
        process: ProcessId,
    ) -> Result<CoreId, SchedError> {
        if alloc.descriptor(process).guarantee_deficit() == 0 {
            return Err(SchedError::NoCoreAvailable {
                process,
                reason: NoCoreReason::PolicyDeclined,
            });
        }
        alloc.grant_core(process)
    }

    fn on_epoch(&mut self, alloc: &mut Allocator, idle_edges: &CoreSet) {
        let short: Vec<(ProcessId, usize)> = alloc
            .processes()
            .iter()
            .map(|descriptor| (descriptor.id(), descriptor.guarantee_deficit()))
            .filter(|(_, deficit)| *deficit > 0)
            .collect();
        for (process, deficit) in short {
            for _ in 0..deficit {
                if let Err(err) = alloc.grant_core_hinted(process, idle_edges) {
                    log::trace!("{}: {}", self.name(), err);
                    break;
                }
            }
        }
    }
}
