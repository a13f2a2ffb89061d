use crate::actions::{Action, Proposal};
use crate::constraints::RebalanceConfig;
use crate::load::BrokerLoads;
use crate::models::PartitionList;
use crate::RebalancerError;
use super::{Step, StepName, StepOutcome};

/// Moves the first replica found on a broker outside its partition's allowed
/// set to the least loaded allowed broker not already hosting a replica
pub struct MoveDisallowedReplicas;

impl Step for MoveDisallowedReplicas {
    fn name(&self) -> StepName {
        StepName::MoveDisallowedReplicas
    }

    fn apply(
        &self,
        list: &PartitionList,
        _config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError> {
        let loads = BrokerLoads::compute(list);

        for partition in &list.partitions {
            let Some(&disallowed) = partition.replicas.iter().find(|&&b| !partition.allows(b))
            else {
                continue;
            };

            let replacement = loads
                .order_by_load(partition.allowed())
                .into_iter()
                .find(|&b| !partition.hosts(b))
                .ok_or_else(|| RebalancerError::NoReplacementBroker {
                    partition: partition.key(),
                    broker: disallowed,
                })?;

            return Ok(StepOutcome::Proposed(Proposal::new(
                self.name(),
                Action::relocate(partition, disallowed, replacement),
                partition,
            )));
        }

        Ok(StepOutcome::Unchanged)
    }
}
