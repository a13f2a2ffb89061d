use crate::models::BrokerId;

/// Settings that control which moves the optimization steps may propose
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceConfig {
    /// Whether leader replicas may be relocated
    pub allow_leader_moves: bool,

    /// Partitions targeting fewer replicas than this are never relocated
    /// (they are still repaired by the structural steps)
    pub min_replicas_for_rebalancing: usize,

    /// Minimum unbalance reduction a relocation must achieve
    pub min_unbalance_improvement: f64,

    /// Broker pool overriding the brokers seen in the partition list
    pub candidate_brokers: Option<Vec<BrokerId>>,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            allow_leader_moves: false,
            min_replicas_for_rebalancing: 2,
            min_unbalance_improvement: 0.00001,
            candidate_brokers: None,
        }
    }
}

impl RebalanceConfig {
    /// Spread load over an explicit broker pool, e.g. after adding brokers
    /// that do not host any replica yet
    pub fn for_broker_pool(brokers: Vec<BrokerId>) -> Self {
        Self {
            candidate_brokers: Some(brokers),
            ..Default::default()
        }
    }

    /// Allow leaders to be relocated as well as followers
    pub fn with_leader_moves(mut self) -> Self {
        self.allow_leader_moves = true;
        self
    }

    pub fn with_min_replicas(mut self, min_replicas: usize) -> Self {
        self.min_replicas_for_rebalancing = min_replicas;
        self
    }

    pub fn with_min_unbalance_improvement(mut self, improvement: f64) -> Self {
        self.min_unbalance_improvement = improvement;
        self
    }

    /// Check if leadership changes are allowed
    pub fn can_change_leadership(&self) -> bool {
        self.allow_leader_moves
    }

    /// Check if a partition targeting `num_replicas` replicas may be relocated
    pub fn can_rebalance(&self, num_replicas: usize) -> bool {
        num_replicas >= self.min_replicas_for_rebalancing
    }

    pub fn candidate_brokers(&self) -> &[BrokerId] {
        self.candidate_brokers.as_deref().unwrap_or(&[])
    }
}
