use crate::models::{BrokerId, PartitionList};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Load carried by a single broker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrokerLoad {
    pub id: BrokerId,
    pub load: f64,
}

impl BrokerLoad {
    /// Ascending by load, ties broken by ascending broker id
    pub fn by_load(a: &BrokerLoad, b: &BrokerLoad) -> Ordering {
        a.load.total_cmp(&b.load).then(a.id.cmp(&b.id))
    }
}

/// Aggregate load per broker for a partition list.
///
/// Built fresh for every step so no state leaks between invocations. The map
/// is ordered by broker id, so every walk over it and every floating point sum
/// taken from it happens in the same order on every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrokerLoads {
    loads: BTreeMap<BrokerId, f64>,
}

impl BrokerLoads {
    /// Followers add the partition weight to their broker, the leader adds
    /// `weight * (replica count + consumers)`.
    pub fn compute(list: &PartitionList) -> Self {
        let mut loads = BTreeMap::new();
        for partition in &list.partitions {
            for (idx, &broker) in partition.replicas.iter().enumerate() {
                let load = if idx == 0 {
                    partition.leader_load()
                } else {
                    partition.follower_load()
                };
                *loads.entry(broker).or_insert(0.0) += load;
            }
        }
        Self { loads }
    }

    /// Extend the index with zero-load entries for brokers not hosting anything
    pub fn with_brokers(mut self, brokers: &[BrokerId]) -> Self {
        for &broker in brokers {
            self.loads.entry(broker).or_insert(0.0);
        }
        self
    }

    /// Load of `broker`, 0 for brokers without replicas
    pub fn get(&self, broker: BrokerId) -> f64 {
        self.loads.get(&broker).copied().unwrap_or(0.0)
    }

    /// All indexed brokers, least loaded first
    pub fn ranked(&self) -> Vec<BrokerLoad> {
        let mut ranked: Vec<BrokerLoad> = self
            .loads
            .iter()
            .map(|(&id, &load)| BrokerLoad { id, load })
            .collect();
        ranked.sort_by(BrokerLoad::by_load);
        ranked
    }

    /// The candidate brokers ordered least loaded first.
    ///
    /// Candidates missing from the index count as load 0. Duplicate
    /// candidates are collapsed.
    pub fn order_by_load(&self, candidates: &[BrokerId]) -> Vec<BrokerId> {
        let mut ordered: Vec<BrokerLoad> = candidates
            .iter()
            .map(|&id| BrokerLoad {
                id,
                load: self.get(id),
            })
            .collect();
        ordered.sort_by(BrokerLoad::by_load);
        ordered.dedup_by_key(|b| b.id);
        ordered.into_iter().map(|b| b.id).collect()
    }
}
