// Kafka Replica Balancer Library
// Deterministic, one-change-at-a-time replica placement for Kafka partitions

pub mod actions;
pub mod cli;
pub mod codec;
pub mod constraints;
pub mod load;
pub mod models;
pub mod optimizer;
pub mod steps;
pub mod unbalance;

pub use actions::{Action, PlanSummary, Proposal, RebalancePlan};
pub use constraints::RebalanceConfig;
pub use load::{BrokerLoad, BrokerLoads};
pub use models::{BrokerId, Partition, PartitionId, PartitionKey, PartitionList, TopicName};
pub use optimizer::Optimizer;
pub use steps::{Step, StepName, StepOutcome};
pub use unbalance::unbalance;

use tracing::{debug, info};

/// Main entry point for generating rebalance proposals
pub struct Rebalancer {
    optimizer: Optimizer,
}

impl Rebalancer {
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self {
            optimizer: Optimizer::new(steps),
        }
    }

    /// Propose the next single change for the given partitions
    pub fn propose(
        &self,
        list: &PartitionList,
        config: &RebalanceConfig,
    ) -> Result<Option<Proposal>, BalanceError> {
        self.optimizer.propose(list, config)
    }

    /// The next change as a partition list: empty once converged, otherwise
    /// holding exactly the one changed partition.
    pub fn balance(
        &self,
        list: &PartitionList,
        config: &RebalanceConfig,
    ) -> Result<PartitionList, BalanceError> {
        Ok(self
            .propose(list, config)?
            .map(|proposal| proposal.delta())
            .unwrap_or_default())
    }

    /// Generate a rebalance plan of at most `max_reassignments` changes.
    ///
    /// Each change is merged into `working` before the next one is computed,
    /// so on return `working` holds the rebalanced partition list.
    pub fn generate_plan(
        &self,
        working: &mut PartitionList,
        config: &RebalanceConfig,
        max_reassignments: usize,
    ) -> Result<RebalancePlan, BalanceError> {
        info!(
            allow_leader_moves = config.allow_leader_moves,
            min_replicas = config.min_replicas_for_rebalancing,
            min_unbalance_improvement = config.min_unbalance_improvement,
            brokers = ?config.candidate_brokers,
            "rebalance config"
        );
        debug!(steps = ?self.optimizer.step_names(), "pipeline");

        let mut plan = RebalancePlan::new();
        for _ in 0..max_reassignments {
            match self.optimizer.advance(working, config)? {
                Some(proposal) => {
                    info!(
                        step = %proposal.step,
                        partition = %proposal.partition.key(),
                        replicas = ?proposal.partition.replicas,
                        brokers = ?proposal.action.affected_brokers(),
                        "{}",
                        proposal.action.description()
                    );
                    plan.push(proposal);
                }
                None => {
                    debug!("no candidate changes");
                    plan.converged = true;
                    break;
                }
            }
        }

        info!(
            created_at = %plan.metadata.created_at,
            summary = %plan.summary(),
            "rebalance plan ready"
        );
        Ok(plan)
    }
}

impl Default for Rebalancer {
    fn default() -> Self {
        Self {
            optimizer: Optimizer::default(),
        }
    }
}

/// Run the standard pipeline once. See [`Rebalancer::balance`].
pub fn balance(list: &PartitionList, config: &RebalanceConfig) -> Result<PartitionList, BalanceError> {
    Rebalancer::default().balance(list, config)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RebalancerError {
    #[error("partition {partition} {}", weight_mismatch(.weighted))]
    InconsistentWeights {
        partition: PartitionKey,
        weighted: bool,
    },

    #[error("partition {partition} has a negative weight {weight}")]
    NegativeWeight { partition: PartitionKey, weight: f64 },

    #[error("partition {partition} lists broker {broker} more than once")]
    DuplicateReplica {
        partition: PartitionKey,
        broker: BrokerId,
    },

    #[error("unable to pick replica to remove from partition {partition}")]
    NoRemovableReplica { partition: PartitionKey },

    #[error("unable to pick replica to add to partition {partition}")]
    NoAddableReplica { partition: PartitionKey },

    #[error("unable to pick replacement for broker {broker} in partition {partition}")]
    NoReplacementBroker {
        partition: PartitionKey,
        broker: BrokerId,
    },
}

fn weight_mismatch(weighted: &bool) -> &'static str {
    if *weighted {
        "has a weight but other partitions don't have it"
    } else {
        "has no weight but other partitions have it"
    }
}

/// A step failure, tagged with the step that raised it
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{step}: {source}")]
pub struct BalanceError {
    pub step: StepName,
    pub source: RebalancerError,
}
