use crate::models::*;
use crate::steps::StepName;
use serde::{Deserialize, Serialize};

/// A single replica change proposed for one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Drop the replica hosted on `broker`
    RemoveReplica {
        topic: TopicName,
        partition: PartitionId,
        broker: BrokerId,
    },

    /// Append a new follower on `broker`
    AddReplica {
        topic: TopicName,
        partition: PartitionId,
        broker: BrokerId,
    },

    /// Replace the replica on `from_broker` with one on `to_broker`,
    /// keeping its position in the replica list
    MoveReplica {
        topic: TopicName,
        partition: PartitionId,
        from_broker: BrokerId,
        to_broker: BrokerId,
    },
}

impl Action {
    pub fn remove(partition: &Partition, broker: BrokerId) -> Self {
        Action::RemoveReplica {
            topic: partition.topic.clone(),
            partition: partition.partition,
            broker,
        }
    }

    pub fn add(partition: &Partition, broker: BrokerId) -> Self {
        Action::AddReplica {
            topic: partition.topic.clone(),
            partition: partition.partition,
            broker,
        }
    }

    pub fn relocate(partition: &Partition, from_broker: BrokerId, to_broker: BrokerId) -> Self {
        Action::MoveReplica {
            topic: partition.topic.clone(),
            partition: partition.partition,
            from_broker,
            to_broker,
        }
    }

    pub fn key(&self) -> PartitionKey {
        match self {
            Action::RemoveReplica {
                topic, partition, ..
            }
            | Action::AddReplica {
                topic, partition, ..
            }
            | Action::MoveReplica {
                topic, partition, ..
            } => PartitionKey::new(topic.clone(), *partition),
        }
    }

    /// Build the changed partition.
    ///
    /// # Panics
    ///
    /// Panics when asked to remove or move a broker the partition does not
    /// host: the step that picked the broker broke its own preconditions.
    pub fn apply(&self, partition: &Partition) -> Partition {
        let mut changed = partition.clone();
        match self {
            Action::RemoveReplica { broker, .. } => {
                let idx = replica_position(partition, *broker);
                changed.replicas.remove(idx);
            }
            Action::AddReplica { broker, .. } => {
                assert!(
                    !partition.hosts(*broker),
                    "partition {} replicas already contain {}",
                    partition.key(),
                    broker
                );
                changed.replicas.push(*broker);
            }
            Action::MoveReplica {
                from_broker,
                to_broker,
                ..
            } => {
                let idx = replica_position(partition, *from_broker);
                changed.replicas[idx] = *to_broker;
            }
        }
        changed
    }

    /// Get the brokers affected by this action
    pub fn affected_brokers(&self) -> Vec<BrokerId> {
        match self {
            Action::RemoveReplica { broker, .. } => vec![*broker],
            Action::AddReplica { broker, .. } => vec![*broker],
            Action::MoveReplica {
                from_broker,
                to_broker,
                ..
            } => vec![*from_broker, *to_broker],
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> String {
        match self {
            Action::RemoveReplica {
                topic,
                partition,
                broker,
            } => format!(
                "Remove replica of {}/{} from broker {}",
                topic, partition, broker
            ),
            Action::AddReplica {
                topic,
                partition,
                broker,
            } => format!("Add replica of {}/{} to broker {}", topic, partition, broker),
            Action::MoveReplica {
                topic,
                partition,
                from_broker,
                to_broker,
            } => format!(
                "Move replica of {}/{} from broker {} to {}",
                topic, partition, from_broker, to_broker
            ),
        }
    }
}

fn replica_position(partition: &Partition, broker: BrokerId) -> usize {
    match partition.replicas.iter().position(|&b| b == broker) {
        Some(idx) => idx,
        None => panic!(
            "partition {} replicas {:?} don't contain {}",
            partition.key(),
            partition.replicas,
            broker
        ),
    }
}

/// The single change produced by one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Step that produced the change
    pub step: StepName,
    pub action: Action,
    /// The partition after the change
    pub partition: Partition,
}

impl Proposal {
    pub fn new(step: StepName, action: Action, partition: &Partition) -> Self {
        let partition = action.apply(partition);
        Self {
            step,
            action,
            partition,
        }
    }

    /// The change as a single-partition list
    pub fn delta(&self) -> PartitionList {
        PartitionList::single(self.partition.clone())
    }
}

/// Proposals accumulated over repeated pipeline runs
#[derive(Debug, Clone)]
pub struct RebalancePlan {
    pub proposals: Vec<Proposal>,
    /// Whether the last run reported no further change
    pub converged: bool,
    pub metadata: PlanMetadata,
}

impl RebalancePlan {
    pub fn new() -> Self {
        Self {
            proposals: Vec::new(),
            converged: false,
            metadata: PlanMetadata::default(),
        }
    }

    pub fn push(&mut self, proposal: Proposal) {
        self.proposals.push(proposal);
    }

    /// Check if this plan is empty
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Every changed partition once, in its final state, in the order it
    /// was first changed
    pub fn reassignments(&self) -> PartitionList {
        let mut partitions: Vec<Partition> = Vec::new();
        for proposal in &self.proposals {
            let changed = &proposal.partition;
            let key = proposal.action.key();
            match partitions.iter_mut().find(|p| p.key() == key) {
                Some(existing) => *existing = changed.clone(),
                None => partitions.push(changed.clone()),
            }
        }
        PartitionList::new(partitions)
    }

    /// Get summary statistics
    pub fn summary(&self) -> PlanSummary {
        let mut move_count = 0;
        let mut add_replica_count = 0;
        let mut remove_replica_count = 0;

        for proposal in &self.proposals {
            match proposal.action {
                Action::MoveReplica { .. } => move_count += 1,
                Action::AddReplica { .. } => add_replica_count += 1,
                Action::RemoveReplica { .. } => remove_replica_count += 1,
            }
        }

        PlanSummary {
            total_actions: self.proposals.len(),
            move_count,
            add_replica_count,
            remove_replica_count,
            partitions_changed: self.reassignments().len(),
            converged: self.converged,
        }
    }
}

impl Default for RebalancePlan {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Default for PlanMetadata {
    fn default() -> Self {
        Self {
            created_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_actions: usize,
    pub move_count: usize,
    pub add_replica_count: usize,
    pub remove_replica_count: usize,
    pub partitions_changed: usize,
    pub converged: bool,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total Actions: {}, Moves: {}, Additions: {}, Removals: {}, Partitions: {}, Converged: {}",
            self.total_actions,
            self.move_count,
            self.add_replica_count,
            self.remove_replica_count,
            self.partitions_changed,
            self.converged
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition() -> Partition {
        Partition::new("a", 1, vec![1, 2, 3]).with_weight(1.0)
    }

    #[test]
    fn test_remove_keeps_order() {
        let p = partition();
        let changed = Action::remove(&p, 2).apply(&p);
        assert_eq!(changed.replicas, vec![1, 3]);
        assert_eq!(changed.weight, 1.0);
        assert_eq!(p.replicas, vec![1, 2, 3]);
    }

    #[test]
    fn test_add_appends_follower() {
        let p = partition();
        let changed = Action::add(&p, 4).apply(&p);
        assert_eq!(changed.replicas, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_move_keeps_position() {
        let p = partition();
        assert_eq!(Action::relocate(&p, 1, 5).apply(&p).replicas, vec![5, 2, 3]);
        assert_eq!(Action::relocate(&p, 3, 5).apply(&p).replicas, vec![1, 2, 5]);
    }

    #[test]
    #[should_panic(expected = "don't contain 7")]
    fn test_move_of_missing_replica_panics() {
        let p = partition();
        Action::relocate(&p, 7, 5).apply(&p);
    }

    #[test]
    #[should_panic(expected = "already contain 2")]
    fn test_add_of_hosted_broker_panics() {
        let p = partition();
        Action::add(&p, 2).apply(&p);
    }

    #[test]
    fn test_description() {
        let p = partition();
        assert_eq!(
            Action::relocate(&p, 1, 4).description(),
            "Move replica of a/1 from broker 1 to 4"
        );
        assert_eq!(Action::relocate(&p, 1, 4).affected_brokers(), vec![1, 4]);
        assert_eq!(Action::remove(&p, 1).key(), PartitionKey::new("a", 1));
    }

    #[test]
    fn test_reassignments_keep_final_state_once() {
        let a1 = partition();
        let b1 = Partition::new("b", 1, vec![1, 2]).with_weight(1.0);

        let first = Proposal::new(StepName::MoveNonLeaders, Action::relocate(&a1, 2, 4), &a1);
        let second = Proposal::new(StepName::MoveNonLeaders, Action::relocate(&b1, 2, 3), &b1);
        let third = Proposal::new(
            StepName::MoveLeaders,
            Action::relocate(&first.partition, 1, 5),
            &first.partition,
        );

        let mut plan = RebalancePlan::new();
        plan.push(first);
        plan.push(second);
        plan.push(third);

        let reassignments = plan.reassignments();
        assert_eq!(reassignments.version, 1);
        assert_eq!(reassignments.len(), 2);
        assert_eq!(reassignments.partitions[0].replicas, vec![5, 4, 3]);
        assert_eq!(reassignments.partitions[1].replicas, vec![1, 3]);

        let summary = plan.summary();
        assert_eq!(summary.total_actions, 3);
        assert_eq!(summary.move_count, 3);
        assert_eq!(summary.partitions_changed, 2);
        assert!(!summary.converged);
    }
}
