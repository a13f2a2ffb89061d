use crate::constraints::RebalanceConfig;
use crate::models::PartitionList;
use crate::RebalancerError;
use super::{Step, StepName, StepOutcome};

/// Fills in unset weights, allowed brokers and target replica counts.
///
/// Unweighted lists get a weight of 1 everywhere. Partitions without an
/// allowed set may use the configured broker pool, or every broker seen in
/// the list when no pool is configured. An unset target keeps the current
/// replica count.
pub struct FillDefaults;

impl Step for FillDefaults {
    fn name(&self) -> StepName {
        StepName::FillDefaults
    }

    fn apply(
        &self,
        list: &PartitionList,
        config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError> {
        let needs_weights = list.partitions.first().is_some_and(|p| !p.has_weight());
        let needs_defaults = needs_weights
            || list
                .partitions
                .iter()
                .any(|p| p.allowed_brokers.is_none() || p.num_replicas == 0);
        if !needs_defaults {
            return Ok(StepOutcome::Unchanged);
        }

        let brokers = match &config.candidate_brokers {
            Some(brokers) => brokers.clone(),
            None => list.broker_list(),
        };

        let mut filled = list.clone();
        for partition in &mut filled.partitions {
            if needs_weights {
                partition.weight = 1.0;
            }
            if partition.allowed_brokers.is_none() {
                partition.allowed_brokers = Some(brokers.clone());
            }
            if partition.num_replicas == 0 {
                partition.num_replicas = partition.replicas.len();
            }
        }

        Ok(StepOutcome::Normalized(filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Partition;

    fn fill(partitions: Vec<Partition>, config: &RebalanceConfig) -> PartitionList {
        match FillDefaults.apply(&PartitionList::new(partitions), config) {
            Ok(StepOutcome::Normalized(list)) => list,
            other => panic!("expected a normalized list, got {:?}", other),
        }
    }

    #[test]
    fn test_fills_every_unset_field() {
        let list = fill(
            vec![
                Partition::new("a", 1, vec![3, 1]),
                Partition::new("a", 2, vec![2, 5, 1]),
            ],
            &RebalanceConfig::default(),
        );

        for partition in &list.partitions {
            assert_eq!(partition.weight, 1.0);
            assert_eq!(partition.allowed_brokers, Some(vec![1, 2, 3, 5]));
        }
        assert_eq!(list.partitions[0].num_replicas, 2);
        assert_eq!(list.partitions[1].num_replicas, 3);
    }

    #[test]
    fn test_keeps_explicit_values() {
        let list = fill(
            vec![
                Partition::new("a", 1, vec![1, 2])
                    .with_weight(2.5)
                    .with_num_replicas(3)
                    .with_allowed_brokers(vec![1, 2, 9]),
                Partition::new("a", 2, vec![1, 2]).with_weight(0.5),
            ],
            &RebalanceConfig::default(),
        );

        let first = &list.partitions[0];
        assert_eq!(first.weight, 2.5);
        assert_eq!(first.num_replicas, 3);
        assert_eq!(first.allowed_brokers, Some(vec![1, 2, 9]));

        let second = &list.partitions[1];
        assert_eq!(second.weight, 0.5);
        assert_eq!(second.allowed_brokers, Some(vec![1, 2]));
    }

    #[test]
    fn test_configured_pool_replaces_seen_brokers() {
        let config = RebalanceConfig::for_broker_pool(vec![1, 2, 3, 4]);
        let list = fill(vec![Partition::new("a", 1, vec![1, 2])], &config);
        assert_eq!(list.partitions[0].allowed_brokers, Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_complete_list_is_unchanged() {
        let list = PartitionList::single(
            Partition::new("a", 1, vec![1, 2])
                .with_weight(1.0)
                .with_num_replicas(2)
                .with_allowed_brokers(vec![1, 2]),
        );
        let outcome = FillDefaults.apply(&list, &RebalanceConfig::default());
        assert_eq!(outcome, Ok(StepOutcome::Unchanged));
    }
}
