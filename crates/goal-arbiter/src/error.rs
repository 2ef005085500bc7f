//! Error types for goal installation and arbitration.
//!
//! Scoring never produces errors (bad values sanitize to 0); the
//! `Result`s here cover installation and orchestration faults, which are
//! counted toward failure recovery rather than propagated upward.

use thiserror::Error;

use agent_context::GoalCategory;

/// A goal installation failed at the collaborator boundary.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The external goal stack rejected the goal.
    #[error("goal stack rejected {category}: {detail}")]
    StackRejected {
        category: GoalCategory,
        detail: String,
    },
    /// The goal stack has no backing state for this agent.
    #[error("goal stack has no backing state for this agent")]
    StackUnavailable,
}

/// The selection collaborator failed to complete a pass.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no evaluators registered")]
    NoEvaluators,
    #[error("installation failed: {0}")]
    Install(#[from] InstallError),
}
