use serde::{Deserialize, Serialize};
use super::{BrokerId, PartitionId, PartitionKey, TopicName};

/// A replicated partition as found in a reassignment file.
///
/// The first replica is the leader, the rest are followers. The extension
/// fields (`weight`, `num_replicas`, `brokers`, `num_consumers`) use zero or
/// `None` for "unset" so they stay out of the serialized form until filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub topic: TopicName,
    pub partition: PartitionId,
    pub replicas: Vec<BrokerId>,

    /// Relative load of the partition, 0 when unset
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub weight: f64,

    /// Target replica count, 0 when unset
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub num_replicas: usize,

    /// Brokers this partition may be placed on
    #[serde(rename = "brokers", default, skip_serializing_if = "is_unset_brokers")]
    pub allowed_brokers: Option<Vec<BrokerId>>,

    /// Consumers attached to the leader, 0 means the default of 1
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub num_consumers: u32,
}

impl Partition {
    pub fn new(topic: impl Into<TopicName>, partition: PartitionId, replicas: Vec<BrokerId>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            replicas,
            weight: 0.0,
            num_replicas: 0,
            allowed_brokers: None,
            num_consumers: 0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_num_replicas(mut self, num_replicas: usize) -> Self {
        self.num_replicas = num_replicas;
        self
    }

    pub fn with_allowed_brokers(mut self, brokers: Vec<BrokerId>) -> Self {
        self.allowed_brokers = Some(brokers);
        self
    }

    pub fn with_num_consumers(mut self, num_consumers: u32) -> Self {
        self.num_consumers = num_consumers;
        self
    }

    pub fn key(&self) -> PartitionKey {
        PartitionKey::new(self.topic.clone(), self.partition)
    }

    pub fn has_weight(&self) -> bool {
        self.weight != 0.0
    }

    pub fn leader(&self) -> Option<BrokerId> {
        self.replicas.first().copied()
    }

    pub fn followers(&self) -> &[BrokerId] {
        self.replicas.get(1..).unwrap_or(&[])
    }

    pub fn consumers(&self) -> u32 {
        if self.num_consumers == 0 {
            1
        } else {
            self.num_consumers
        }
    }

    /// Load the leader replica puts on its broker.
    ///
    /// Leaders serve every follower and every consumer, so they weigh
    /// `weight * (replica count + consumers)`; followers weigh `weight`.
    pub fn leader_load(&self) -> f64 {
        self.weight * (self.replicas.len() as f64 + self.consumers() as f64)
    }

    pub fn follower_load(&self) -> f64 {
        self.weight
    }

    /// Whether `broker` currently hosts a replica of this partition
    pub fn hosts(&self, broker: BrokerId) -> bool {
        self.replicas.contains(&broker)
    }

    /// Whether `broker` is in the allowed set. An unset set allows nothing;
    /// defaults are filled before any placement decision is taken.
    pub fn allows(&self, broker: BrokerId) -> bool {
        self.allowed_brokers
            .as_ref()
            .map(|brokers| brokers.contains(&broker))
            .unwrap_or(false)
    }

    pub fn allowed(&self) -> &[BrokerId] {
        self.allowed_brokers.as_deref().unwrap_or(&[])
    }

    pub fn is_over_replicated(&self) -> bool {
        self.num_replicas < self.replicas.len()
    }

    pub fn is_under_replicated(&self) -> bool {
        self.num_replicas > self.replicas.len()
    }
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn is_unset_brokers(value: &Option<Vec<BrokerId>>) -> bool {
    value.as_ref().map_or(true, |brokers| brokers.is_empty())
}
