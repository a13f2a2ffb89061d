use std::collections::HashSet;
use crate::constraints::RebalanceConfig;
use crate::models::PartitionList;
use crate::RebalancerError;
use super::{Step, StepName, StepOutcome};

/// Requires that either every partition carries a positive weight or none
/// carries a weight at all
pub struct ValidateWeights;

impl Step for ValidateWeights {
    fn name(&self) -> StepName {
        StepName::ValidateWeights
    }

    fn apply(
        &self,
        list: &PartitionList,
        _config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError> {
        let Some(first) = list.partitions.first() else {
            return Ok(StepOutcome::Unchanged);
        };
        let weighted = first.has_weight();

        for partition in &list.partitions {
            if partition.has_weight() != weighted {
                return Err(RebalancerError::InconsistentWeights {
                    partition: partition.key(),
                    weighted: partition.has_weight(),
                });
            }
            if partition.weight < 0.0 {
                return Err(RebalancerError::NegativeWeight {
                    partition: partition.key(),
                    weight: partition.weight,
                });
            }
        }

        Ok(StepOutcome::Unchanged)
    }
}

/// Rejects partitions listing the same broker more than once
pub struct ValidateReplicas;

impl Step for ValidateReplicas {
    fn name(&self) -> StepName {
        StepName::ValidateReplicas
    }

    fn apply(
        &self,
        list: &PartitionList,
        _config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError> {
        for partition in &list.partitions {
            let mut seen = HashSet::with_capacity(partition.replicas.len());
            for &broker in &partition.replicas {
                if !seen.insert(broker) {
                    return Err(RebalancerError::DuplicateReplica {
                        partition: partition.key(),
                        broker,
                    });
                }
            }
        }

        Ok(StepOutcome::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Partition, PartitionKey};

    fn check_weights(partitions: Vec<Partition>) -> Result<StepOutcome, RebalancerError> {
        ValidateWeights.apply(&PartitionList::new(partitions), &RebalanceConfig::default())
    }

    #[test]
    fn test_all_weighted_or_none_weighted_pass() {
        let weighted = check_weights(vec![
            Partition::new("a", 1, vec![1, 2]).with_weight(1.0),
            Partition::new("a", 2, vec![2, 1]).with_weight(3.0),
        ]);
        assert_eq!(weighted, Ok(StepOutcome::Unchanged));

        let unweighted = check_weights(vec![
            Partition::new("a", 1, vec![1, 2]),
            Partition::new("a", 2, vec![2, 1]),
        ]);
        assert_eq!(unweighted, Ok(StepOutcome::Unchanged));
    }

    #[test]
    fn test_missing_weight_is_inconsistent() {
        let result = check_weights(vec![
            Partition::new("a", 1, vec![1, 2]).with_weight(1.0),
            Partition::new("a", 2, vec![2, 1]),
        ]);
        assert_eq!(
            result,
            Err(RebalancerError::InconsistentWeights {
                partition: PartitionKey::new("a", 2),
                weighted: false,
            })
        );
    }

    #[test]
    fn test_extra_weight_is_inconsistent() {
        let result = check_weights(vec![
            Partition::new("a", 1, vec![1, 2]),
            Partition::new("a", 2, vec![2, 1]).with_weight(1.0),
        ]);
        assert!(matches!(
            result,
            Err(RebalancerError::InconsistentWeights { weighted: true, .. })
        ));
    }

    #[test]
    fn test_negative_weight() {
        let result = check_weights(vec![
            Partition::new("a", 1, vec![1, 2]).with_weight(1.0),
            Partition::new("a", 2, vec![2, 1]).with_weight(-1.0),
        ]);
        assert_eq!(
            result,
            Err(RebalancerError::NegativeWeight {
                partition: PartitionKey::new("a", 2),
                weight: -1.0,
            })
        );
    }

    #[test]
    fn test_empty_list_passes() {
        assert_eq!(check_weights(vec![]), Ok(StepOutcome::Unchanged));
    }

    #[test]
    fn test_duplicate_replica() {
        let list = PartitionList::new(vec![
            Partition::new("a", 1, vec![1, 2]),
            Partition::new("a", 2, vec![3, 1, 3]),
        ]);
        let result = ValidateReplicas.apply(&list, &RebalanceConfig::default());
        assert_eq!(
            result,
            Err(RebalancerError::DuplicateReplica {
                partition: PartitionKey::new("a", 2),
                broker: 3,
            })
        );
    }
}
