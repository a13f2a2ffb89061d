use crate::actions::{Action, Proposal};
use crate::constraints::RebalanceConfig;
use crate::load::BrokerLoads;
use crate::models::PartitionList;
use crate::RebalancerError;
use super::{Step, StepName, StepOutcome};

/// Drops one replica from the first partition hosting more replicas than
/// its target, picking the least loaded allowed broker that hosts one
pub struct RemoveExtraReplicas;

impl Step for RemoveExtraReplicas {
    fn name(&self) -> StepName {
        StepName::RemoveExtraReplicas
    }

    fn apply(
        &self,
        list: &PartitionList,
        _config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError> {
        let Some(partition) = list.partitions.iter().find(|p| p.is_over_replicated()) else {
            return Ok(StepOutcome::Unchanged);
        };

        let loads = BrokerLoads::compute(list);
        let broker = loads
            .order_by_load(partition.allowed())
            .into_iter()
            .find(|&b| partition.hosts(b))
            .ok_or_else(|| RebalancerError::NoRemovableReplica {
                partition: partition.key(),
            })?;

        Ok(StepOutcome::Proposed(Proposal::new(
            self.name(),
            Action::remove(partition, broker),
            partition,
        )))
    }
}

/// Adds one follower to the first partition hosting fewer replicas than its
/// target.
///
/// Candidates are scanned from the most loaded allowed broker down; the
/// relocation steps move the load off again if that turns out unbalancing.
pub struct AddMissingReplicas;

impl Step for AddMissingReplicas {
    fn name(&self) -> StepName {
        StepName::AddMissingReplicas
    }

    fn apply(
        &self,
        list: &PartitionList,
        _config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError> {
        let Some(partition) = list.partitions.iter().find(|p| p.is_under_replicated()) else {
            return Ok(StepOutcome::Unchanged);
        };

        let loads = BrokerLoads::compute(list);
        let broker = loads
            .order_by_load(partition.allowed())
            .into_iter()
            .rev()
            .find(|&b| !partition.hosts(b))
            .ok_or_else(|| RebalancerError::NoAddableReplica {
                partition: partition.key(),
            })?;

        Ok(StepOutcome::Proposed(Proposal::new(
            self.name(),
            Action::add(partition, broker),
            partition,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Partition, PartitionKey};
    use crate::steps::testing::{filled, proposed};

    #[test]
    fn test_removes_least_loaded_replica() {
        let config = RebalanceConfig::default();
        let list = filled(
            vec![Partition::new("a", 1, vec![1, 2, 3]).with_num_replicas(2)],
            &config,
        );

        // broker 1 leads (load 4), brokers 2 and 3 tie at 1: lowest id goes
        let proposal = proposed(RemoveExtraReplicas.apply(&list, &config).unwrap());
        assert_eq!(proposal.step, StepName::RemoveExtraReplicas);
        assert_eq!(proposal.partition.replicas, vec![1, 3]);
        assert_eq!(proposal.partition.num_replicas, 2);
    }

    #[test]
    fn test_only_first_over_replicated_partition() {
        let config = RebalanceConfig::default();
        let list = filled(
            vec![
                Partition::new("a", 1, vec![1, 2]),
                Partition::new("a", 2, vec![3, 2, 1]).with_num_replicas(1),
                Partition::new("a", 3, vec![1, 2, 3]).with_num_replicas(1),
            ],
            &config,
        );

        let proposal = proposed(RemoveExtraReplicas.apply(&list, &config).unwrap());
        assert_eq!(proposal.partition.key(), PartitionKey::new("a", 2));
        // loads: 1 -> 3 + 1 + 4, 2 -> 1 + 1 + 1, 3 -> 4 + 1
        assert_eq!(proposal.partition.replicas, vec![3, 1]);
    }

    #[test]
    fn test_no_removable_replica_outside_allowed_set() {
        let config = RebalanceConfig::default();
        let list = filled(
            vec![Partition::new("a", 1, vec![1, 2])
                .with_num_replicas(1)
                .with_allowed_brokers(vec![3])],
            &config,
        );

        assert_eq!(
            RemoveExtraReplicas.apply(&list, &config),
            Err(RebalancerError::NoRemovableReplica {
                partition: PartitionKey::new("a", 1)
            })
        );
    }

    #[test]
    fn test_adds_allowed_broker() {
        let config = RebalanceConfig::default();
        let list = filled(
            vec![Partition::new("a", 1, vec![1, 2])
                .with_weight(1.0)
                .with_num_replicas(3)
                .with_allowed_brokers(vec![1, 2, 3])],
            &config,
        );

        let proposal = proposed(AddMissingReplicas.apply(&list, &config).unwrap());
        assert_eq!(proposal.step, StepName::AddMissingReplicas);
        assert_eq!(proposal.partition.replicas, vec![1, 2, 3]);
    }

    #[test]
    fn test_adds_most_loaded_free_broker() {
        let config = RebalanceConfig::default();
        let list = filled(
            vec![
                Partition::new("a", 1, vec![1]).with_num_replicas(2),
                Partition::new("b", 1, vec![3, 2]),
                Partition::new("b", 2, vec![3, 4]),
            ],
            &config,
        );

        // loads: 1 -> 2, 2 -> 1, 3 -> 6, 4 -> 1
        let proposal = proposed(AddMissingReplicas.apply(&list, &config).unwrap());
        assert_eq!(proposal.partition.replicas, vec![1, 3]);
    }

    #[test]
    fn test_no_addable_replica() {
        let config = RebalanceConfig::default();
        let list = filled(
            vec![Partition::new("a", 1, vec![1, 2]).with_num_replicas(3)],
            &config,
        );

        assert_eq!(
            AddMissingReplicas.apply(&list, &config),
            Err(RebalancerError::NoAddableReplica {
                partition: PartitionKey::new("a", 1)
            })
        );
    }

    #[test]
    fn test_satisfied_targets_are_unchanged() {
        let config = RebalanceConfig::default();
        let list = filled(vec![Partition::new("a", 1, vec![1, 2])], &config);
        assert_eq!(RemoveExtraReplicas.apply(&list, &config), Ok(StepOutcome::Unchanged));
        assert_eq!(AddMissingReplicas.apply(&list, &config), Ok(StepOutcome::Unchanged));
    }
}
