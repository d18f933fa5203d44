//! Error types for the habitat-projects crate.
//!
//! Every variant here is a configuration error: it is raised at the moment
//! a project or step is set up wrongly and is never corrected silently.

use habitat_types::Stage;

use crate::project::StepId;

/// Errors raised while building or driving a project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// A step may only target a stage that carries work.
    #[error("a step cannot target the {stage} stage")]
    IllegalStepStage {
        /// The rejected target stage.
        stage: Stage,
    },

    /// Steps must be queued in non-decreasing stage order.
    #[error("step for stage {stage} added after a step for stage {last}")]
    NonMonotonicStep {
        /// Stage of the step being added.
        stage: Stage,
        /// Stage of the last step already queued.
        last: Stage,
    },

    /// The project is done or aborted and accepts no further changes.
    #[error("project '{name}' is already {stage}")]
    Finished {
        /// Project name.
        name: String,
        /// The terminal stage the project is in.
        stage: Stage,
    },

    /// No remaining step carries this id.
    #[error("step {id} not found")]
    StepNotFound {
        /// The requested step id.
        id: StepId,
    },

    /// Only steps that have not been started can be removed.
    #[error("step {id} ('{description}') has already started")]
    StepStarted {
        /// The step id.
        id: StepId,
        /// The step description.
        description: String,
    },

    /// The transition table does not allow this stage change.
    #[error("illegal stage transition from {from} to {to}")]
    IllegalTransition {
        /// Current stage.
        from: Stage,
        /// Requested stage.
        to: Stage,
    },
}
