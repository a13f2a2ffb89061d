use crate::actions::Proposal;
use crate::constraints::RebalanceConfig;
use crate::models::PartitionList;
use crate::RebalancerError;
use std::fmt;

/// Tag identifying a step in diagnostics and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepName {
    ValidateWeights,
    ValidateReplicas,
    FillDefaults,
    RemoveExtraReplicas,
    AddMissingReplicas,
    MoveDisallowedReplicas,
    MoveNonLeaders,
    MoveLeaders,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::ValidateWeights => "ValidateWeights",
            StepName::ValidateReplicas => "ValidateReplicas",
            StepName::FillDefaults => "FillDefaults",
            StepName::RemoveExtraReplicas => "RemoveExtraReplicas",
            StepName::AddMissingReplicas => "AddMissingReplicas",
            StepName::MoveDisallowedReplicas => "MoveDisallowedReplicas",
            StepName::MoveNonLeaders => "MoveNonLeaders",
            StepName::MoveLeaders => "MoveLeaders",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a step did with the partition list it was given
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Nothing to do, move on to the next step
    Unchanged,
    /// A normalized copy of the list the remaining steps should work on.
    /// Never a placement change.
    Normalized(PartitionList),
    /// A single-partition change; the pipeline stops here
    Proposed(Proposal),
}

/// One stage of the rebalancing pipeline.
///
/// Steps are pure functions of the list and the configuration: they build
/// whatever load index they need from scratch and never touch their input.
pub trait Step: Send + Sync {
    /// Name of this step
    fn name(&self) -> StepName;

    /// Inspect the list and report at most one change
    fn apply(
        &self,
        list: &PartitionList,
        config: &RebalanceConfig,
    ) -> Result<StepOutcome, RebalancerError>;
}

// Module declarations
mod validate;
mod defaults;
mod replica_count;
mod disallowed;
mod relocation;

// Re-exports
pub use validate::{ValidateReplicas, ValidateWeights};
pub use defaults::FillDefaults;
pub use replica_count::{AddMissingReplicas, RemoveExtraReplicas};
pub use disallowed::MoveDisallowedReplicas;
pub use relocation::{MoveLeaders, MoveNonLeaders};

/// The full pipeline, in execution order
pub fn standard_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(ValidateWeights),
        Box::new(ValidateReplicas),
        Box::new(FillDefaults),
        Box::new(RemoveExtraReplicas),
        Box::new(AddMissingReplicas),
        Box::new(MoveDisallowedReplicas),
        Box::new(MoveNonLeaders),
        Box::new(MoveLeaders),
    ]
}
