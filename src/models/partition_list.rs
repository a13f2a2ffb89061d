use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use super::{BrokerId, Partition};

/// A versioned list of partitions, the unit read and written by the tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionList {
    pub version: u32,
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

impl PartitionList {
    pub const VERSION: u32 = 1;

    pub fn new(partitions: Vec<Partition>) -> Self {
        Self {
            version: Self::VERSION,
            partitions,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn single(partition: Partition) -> Self {
        Self::new(vec![partition])
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Sorted set of every broker hosting at least one replica
    pub fn broker_list(&self) -> Vec<BrokerId> {
        self.partitions
            .iter()
            .flat_map(|p| p.replicas.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Merge a delta into this list, replacing partitions with the same key.
    ///
    /// A delta partition carries the defaults filled in while it was
    /// computed. When it replaces a partition that had no weight or no
    /// allowed set, those defaults are applied to every other partition
    /// still missing them, so the merged list stays consistently weighted
    /// and can be balanced again.
    ///
    /// Partitions of the delta that are not present here are ignored.
    /// Returns the number of partitions replaced.
    pub fn apply(&mut self, delta: &PartitionList) -> usize {
        let mut replaced = 0;
        let mut default_weight = None;
        let mut default_brokers = None;

        for changed in &delta.partitions {
            let key = changed.key();
            if let Some(existing) = self.partitions.iter_mut().find(|p| p.key() == key) {
                if !existing.has_weight() && changed.has_weight() {
                    default_weight = Some(changed.weight);
                }
                if existing.allowed_brokers.is_none() && changed.allowed_brokers.is_some() {
                    default_brokers = changed.allowed_brokers.clone();
                }
                *existing = changed.clone();
                replaced += 1;
            }
        }

        for partition in &mut self.partitions {
            if let Some(weight) = default_weight.filter(|_| !partition.has_weight()) {
                partition.weight = weight;
            }
            if partition.allowed_brokers.is_none() {
                partition.allowed_brokers = default_brokers.clone();
            }
        }
        replaced
    }
}

impl Default for PartitionList {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_list_is_sorted_and_unique() {
        let list = PartitionList::new(vec![
            Partition::new("a", 1, vec![5, 2, 3]),
            Partition::new("a", 2, vec![3, 1]),
        ]);
        assert_eq!(list.broker_list(), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_apply_replaces_by_key() {
        let mut list = PartitionList::new(vec![
            Partition::new("a", 1, vec![1, 2]),
            Partition::new("b", 1, vec![1, 2]),
        ]);
        let delta = PartitionList::single(Partition::new("b", 1, vec![3, 2]).with_weight(1.0));

        assert_eq!(list.apply(&delta), 1);
        assert_eq!(list.partitions[0].replicas, vec![1, 2]);
        assert_eq!(list.partitions[1].replicas, vec![3, 2]);
        assert_eq!(list.partitions[1].weight, 1.0);
    }

    #[test]
    fn test_apply_spreads_filled_defaults() {
        let mut list = PartitionList::new(vec![
            Partition::new("a", 1, vec![1, 2, 3]),
            Partition::new("a", 2, vec![1, 2, 3]),
            Partition::new("a", 3, vec![1, 2]).with_allowed_brokers(vec![1, 2]),
        ]);
        let delta = PartitionList::single(
            Partition::new("a", 1, vec![1, 4, 3])
                .with_weight(1.0)
                .with_num_replicas(3)
                .with_allowed_brokers(vec![1, 2, 3, 4]),
        );

        assert_eq!(list.apply(&delta), 1);
        assert!(list.partitions.iter().all(|p| p.weight == 1.0));
        assert_eq!(list.partitions[1].allowed_brokers, Some(vec![1, 2, 3, 4]));
        assert_eq!(list.partitions[1].num_replicas, 0);
        assert_eq!(list.partitions[2].allowed_brokers, Some(vec![1, 2]));
    }

    #[test]
    fn test_apply_keeps_explicit_weights() {
        let mut list = PartitionList::new(vec![
            Partition::new("a", 1, vec![1, 2]).with_weight(2.0),
            Partition::new("a", 2, vec![1, 2]).with_weight(3.0),
        ]);
        let delta = PartitionList::single(Partition::new("a", 1, vec![2, 1]).with_weight(2.0));

        list.apply(&delta);
        assert_eq!(list.partitions[0].replicas, vec![2, 1]);
        assert_eq!(list.partitions[1].weight, 3.0);
        assert_eq!(list.partitions[1].allowed_brokers, None);
    }

    #[test]
    fn test_apply_ignores_unknown_partitions() {
        let mut list = PartitionList::single(Partition::new("a", 1, vec![1, 2]));
        let delta = PartitionList::single(Partition::new("a", 9, vec![3]));
        assert_eq!(list.apply(&delta), 0);
        assert_eq!(list.len(), 1);
    }
}
