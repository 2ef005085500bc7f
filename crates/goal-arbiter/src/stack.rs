//! Goal stack collaborator.
//!
//! The goal stack is owned by the host; the arbiter only ever clears it,
//! pushes the winning goal, and reads what is current. The in-memory
//! implementation here covers hosts without their own stack, and tests.

use serde::{Deserialize, Serialize};

use agent_context::{GoalCategory, GoalStatus};

use crate::error::InstallError;

/// A tagged behavior instance held by the goal stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub category: GoalCategory,
    pub status: GoalStatus,
    /// Simulation time the goal became active.
    pub started_at_ms: u64,
}

impl Goal {
    /// Creates an active goal starting now.
    pub fn new(category: GoalCategory, started_at_ms: u64) -> Self {
        Self {
            category,
            status: GoalStatus::Active,
            started_at_ms,
        }
    }
}

/// External goal-stack interface consumed by the arbiter.
pub trait GoalStack {
    /// Drops any held goal.
    fn clear(&mut self);

    /// Installs a goal. Fails only when the collaborator's backing state
    /// is missing or rejects the goal.
    fn push(&mut self, goal: Goal) -> Result<(), InstallError>;

    /// The currently held goal, if any.
    fn current(&self) -> Option<&Goal>;

    /// Marks the current goal finished with the given status.
    fn finish_current(&mut self, status: GoalStatus);
}

/// Single-slot in-memory goal stack.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGoalStack {
    slot: Option<Goal>,
}

impl InMemoryGoalStack {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GoalStack for InMemoryGoalStack {
    fn clear(&mut self) {
        self.slot = None;
    }

    fn push(&mut self, goal: Goal) -> Result<(), InstallError> {
        self.slot = Some(goal);
        Ok(())
    }

    fn current(&self) -> Option<&Goal> {
        self.slot.as_ref()
    }

    fn finish_current(&mut self, status: GoalStatus) {
        if let Some(goal) = self.slot.as_mut() {
            goal.status = status;
        }
    }
}
