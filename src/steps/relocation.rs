use crate::actions::{Action, Proposal};
use crate::constraints::RebalanceConfig;
use crate::load::BrokerLoads;
use crate::models::{BrokerId, PartitionList};
use crate::unbalance::unbalance;
use crate::RebalancerError;
use super::{Step, StepName, StepOutcome};

/// Relocates the single follower replica whose move lowers the unbalance
/// metric the most
pub struct MoveNonLeaders;

impl Step for MoveNonLeaders {
    fn name(&self) -> StepName {
        StepName::MoveNonLeaders
    }

    fn apply(
        &self,
        list: &PartitionList,
        config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError> {
        Ok(best_relocation(list, config, false)
            .map(|(idx, from, to)| {
                let partition = &list.partitions[idx];
                StepOutcome::Proposed(Proposal::new(
                    self.name(),
                    Action::relocate(partition, from, to),
                    partition,
                ))
            })
            .unwrap_or(StepOutcome::Unchanged))
    }
}

/// Relocates the single leader replica whose move lowers the unbalance
/// metric the most. Does nothing unless leader moves are enabled.
pub struct MoveLeaders;

impl Step for MoveLeaders {
    fn name(&self) -> StepName {
        StepName::MoveLeaders
    }

    fn apply(
        &self,
        list: &PartitionList,
        config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError> {
        if !config.can_change_leadership() {
            return Ok(StepOutcome::Unchanged);
        }

        Ok(best_relocation(list, config, true)
            .map(|(idx, from, to)| {
                let partition = &list.partitions[idx];
                StepOutcome::Proposed(Proposal::new(
                    self.name(),
                    Action::relocate(partition, from, to),
                    partition,
                ))
            })
            .unwrap_or(StepOutcome::Unchanged))
    }
}

/// Greedy search over every single-replica move.
///
/// For each eligible partition, every replica in scope is taken off its
/// broker and tried on each allowed broker not already hosting the
/// partition. Brokers are tried least loaded first and partitions and
/// replicas in list order; a candidate replaces the best one only when it
/// is strictly better, so the first of several equal moves wins.
///
/// Returns `(partition index, from broker, to broker)` when the best move
/// beats the current unbalance by more than the configured minimum.
fn best_relocation(
    list: &PartitionList,
    config: &RebalanceConfig,
    leaders: bool,
) -> Option<(usize, BrokerId, BrokerId)> {
    let loads = BrokerLoads::compute(list).with_brokers(config.candidate_brokers());
    // the order of `ranked` fixes the summation order of every score below
    let mut ranked = loads.ranked();
    if ranked.len() < 2 {
        return None;
    }

    let baseline = unbalance(&ranked);
    let mut best_unbalance = baseline;
    let mut best = None;

    for (idx, partition) in list.partitions.iter().enumerate() {
        if !config.can_rebalance(partition.num_replicas) {
            continue;
        }

        let (moving, amount) = if leaders {
            (
                partition.replicas.get(..1).unwrap_or(&[]),
                partition.leader_load(),
            )
        } else {
            (partition.followers(), partition.follower_load())
        };

        for &from in moving {
            let src = match ranked.iter().position(|b| b.id == from) {
                Some(src) => src,
                None => panic!(
                    "replica {} of partition {} missing from broker loads",
                    from,
                    partition.key()
                ),
            };
            let src_load = ranked[src].load;
            ranked[src].load -= amount;

            for dst in 0..ranked.len() {
                let to = ranked[dst].id;
                if !partition.allows(to) || partition.hosts(to) {
                    continue;
                }

                let dst_load = ranked[dst].load;
                ranked[dst].load += amount;
                let candidate = unbalance(&ranked);
                if candidate < best_unbalance {
                    best_unbalance = candidate;
                    best = Some((idx, from, to));
                }
                ranked[dst].load = dst_load;
            }

            ranked[src].load = src_load;
        }
    }

    best.filter(|_| best_unbalance < baseline - config.min_unbalance_improvement)
}
