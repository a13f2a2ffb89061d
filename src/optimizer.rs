use crate::actions::Proposal;
use crate::constraints::RebalanceConfig;
use crate::models::PartitionList;
use crate::steps::{standard_steps, Step, StepName, StepOutcome};
use crate::BalanceError;
use std::borrow::Cow;

/// The optimizer runs the steps in order and stops at the first one that
/// proposes a change
pub struct Optimizer {
    steps: Vec<Box<dyn Step>>,
}

impl Optimizer {
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self { steps }
    }

    pub fn step_names(&self) -> Vec<StepName> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run the pipeline once.
    ///
    /// Returns `Ok(None)` when every step reports no change. A step error
    /// aborts the run and is tagged with the failing step.
    pub fn propose(
        &self,
        list: &PartitionList,
        config: &RebalanceConfig,
    ) -> Result<Option<Proposal>, BalanceError> {
        self.run(list, config).map(|(_, proposal)| proposal)
    }

    /// Run the pipeline once against a caller-owned working list.
    ///
    /// Defaults filled in during the run are kept in `working` and the
    /// proposed change, if any, is merged into it, so repeated calls walk
    /// the list towards convergence.
    pub fn advance(
        &self,
        working: &mut PartitionList,
        config: &RebalanceConfig,
    ) -> Result<Option<Proposal>, BalanceError> {
        let (normalized, proposal) = self.run(working, config)?;
        if let Some(normalized) = normalized {
            *working = normalized;
        }
        if let Some(proposal) = &proposal {
            working.apply(&proposal.delta());
        }
        Ok(proposal)
    }

    fn run(
        &self,
        list: &PartitionList,
        config: &RebalanceConfig,
    ) -> Result<(Option<PartitionList>, Option<Proposal>), BalanceError> {
        let mut working = Cow::Borrowed(list);

        for step in &self.steps {
            let outcome = step
                .apply(&working, config)
                .map_err(|source| BalanceError {
                    step: step.name(),
                    source,
                })?;

            match outcome {
                StepOutcome::Unchanged => {}
                StepOutcome::Normalized(normalized) => working = Cow::Owned(normalized),
                StepOutcome::Proposed(proposal) => {
                    return Ok((normalized_copy(working), Some(proposal)))
                }
            }
        }

        Ok((normalized_copy(working), None))
    }
}

fn normalized_copy(working: Cow<'_, PartitionList>) -> Option<PartitionList> {
    match working {
        Cow::Owned(list) => Some(list),
        Cow::Borrowed(_) => None,
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(standard_steps())
    }
}
