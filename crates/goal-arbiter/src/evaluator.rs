//! Goal evaluator framework.
//!
//! Each behavior category is scored by one evaluator: a stateless
//! scoring contract plus a small per-agent memory record (cooldown
//! timestamps, visibility counters, failure counts). Concrete evaluators
//! compose an [`EvaluatorCore`] that owns the memory map and the score
//! shaping every category shares: bias weight, hint factor, goal
//! affinity, commitment bonus, and the hard `[0, cap]` clamp.

use std::collections::HashMap;

use agent_context::{sanitize, AgentContext, AgentId, DiagnosticEvent, GoalCategory, GoalStatus,
    TickClock};

use crate::commitment::{CommitmentManager, SwitchReason, SwitchUrgency};
use crate::config::EvaluatorConfig;
use crate::error::InstallError;
use crate::hints::PriorityHints;
use crate::stack::{Goal, GoalStack};

/// Per-agent transient evaluator memory.
#[derive(Debug, Clone, Default)]
pub struct EvaluatorMemory {
    pub last_goal_start_ms: Option<u64>,
    pub last_goal_end_ms: Option<u64>,
    pub consecutive_failures: u32,
    /// Consecutive failed visibility checks since the target was last seen.
    pub visibility_misses: u32,
    pub last_desirability: f64,
}

/// Everything an evaluator reads while scoring.
pub struct ScoringEnv<'a> {
    pub hints: &'a PriorityHints,
    pub commitment: &'a CommitmentManager,
    pub config: &'a EvaluatorConfig,
    /// Category of the goal currently on the agent's stack, if any.
    pub current_category: Option<GoalCategory>,
}

/// Mutable collaborators an evaluator touches while installing.
pub struct InstallEnv<'a> {
    pub stack: &'a mut dyn GoalStack,
    pub commitment: &'a mut CommitmentManager,
    pub urgency: SwitchUrgency,
}

/// Result of asking the winning evaluator to install its goal.
#[derive(Debug)]
pub enum InstallOutcome {
    /// The goal was installed; a thrash warning may have fired.
    Installed {
        thrash_warning: Option<DiagnosticEvent>,
    },
    /// The commitment re-check denied the switch; nothing changed.
    Denied(SwitchReason),
}

/// Scoring and installation contract for one behavior category.
pub trait GoalEvaluator {
    /// The category this evaluator scores.
    fn category(&self) -> GoalCategory;

    /// Bounded desirability of this category right now.
    ///
    /// Total over its inputs: never panics past this boundary, returns
    /// exactly 0 when hard preconditions fail, and is clamped to
    /// `[0, score_cap]`.
    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64;

    /// Installs this category's goal after re-checking admissibility.
    fn install_goal(
        &mut self,
        ctx: &AgentContext,
        env: &mut InstallEnv<'_>,
    ) -> Result<InstallOutcome, InstallError>;

    /// Notification that this category's goal ended.
    fn on_goal_end(&mut self, agent_id: AgentId, status: GoalStatus, clock: &TickClock);

    /// Drops per-agent memory for a destroyed agent.
    fn forget_agent(&mut self, agent_id: AgentId);
}

/// A set of boxed evaluators, one per category.
pub type EvaluatorSet = Vec<Box<dyn GoalEvaluator>>;

/// Shared state and score shaping composed by every concrete evaluator.
#[derive(Debug)]
pub struct EvaluatorCore {
    category: GoalCategory,
    bias: f64,
    memory: HashMap<AgentId, EvaluatorMemory>,
}

impl EvaluatorCore {
    pub fn new(category: GoalCategory, bias: f64) -> Self {
        Self {
            category,
            bias: sanitize(bias, 1.0).max(0.0),
            memory: HashMap::new(),
        }
    }

    /// Builds a core with the bias weight configured for its category.
    pub fn from_config(category: GoalCategory, config: &EvaluatorConfig) -> Self {
        Self::new(category, config.bias.for_category(category))
    }

    pub fn category(&self) -> GoalCategory {
        self.category
    }

    pub fn memory(&mut self, agent_id: AgentId) -> &mut EvaluatorMemory {
        self.memory.entry(agent_id).or_default()
    }

    pub fn peek_memory(&self, agent_id: AgentId) -> Option<&EvaluatorMemory> {
        self.memory.get(&agent_id)
    }

    /// Caches and returns a hard-precondition zero.
    pub fn zero(&mut self, agent_id: AgentId) -> f64 {
        self.memory(agent_id).last_desirability = 0.0;
        0.0
    }

    /// True while the post-goal cooldown window is still running.
    pub fn on_cooldown(&self, agent_id: AgentId, clock: &TickClock, config: &EvaluatorConfig) -> bool {
        self.memory
            .get(&agent_id)
            .and_then(|m| m.last_goal_end_ms)
            .map(|end| clock.elapsed_since(end) < config.cooldown_after_goal_ms)
            .unwrap_or(false)
    }

    /// Discount applied after repeated goal failures; halves around
    /// three consecutive failures and recovers on the next success.
    pub fn failure_discount(&self, agent_id: AgentId) -> f64 {
        let failures = self
            .memory
            .get(&agent_id)
            .map(|m| m.consecutive_failures)
            .unwrap_or(0);
        1.0 / (1.0 + 0.3 * failures as f64)
    }

    /// Updates the visibility-miss counter and reports whether the
    /// target is still held: seen this check, or unseen for no more than
    /// the grace number of consecutive checks.
    pub fn target_retained(&mut self, ctx: &AgentContext, grace_frames: u32) -> bool {
        let mem = self.memory.entry(ctx.agent_id).or_default();
        match ctx.target {
            Some(t) if t.visible => {
                mem.visibility_misses = 0;
                true
            }
            Some(_) => {
                mem.visibility_misses = mem.visibility_misses.saturating_add(1);
                mem.visibility_misses <= grace_frames
            }
            None => {
                mem.visibility_misses = 0;
                false
            }
        }
    }

    /// Applies the shared shaping pipeline to a raw score and caches the
    /// result: sanitize, bias, hint factor, affinity bonus, commitment
    /// bonus, clamp to `[0, cap]`.
    pub fn shape(&mut self, raw: f64, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let raw = sanitize(raw, 0.0).max(0.0);
        let hinted = raw * self.bias * env.hints.factor_for(self.category);

        let affinity = if env.current_category == Some(self.category) {
            env.config.affinity_bonus
        } else {
            0.0
        };
        let bonus =
            env.commitment
                .commitment_bonus(ctx.agent_id, self.category, hinted, &ctx.clock);

        let shaped = (hinted + affinity + bonus).clamp(0.0, env.config.score_cap);
        self.memory(ctx.agent_id).last_desirability = shaped;
        shaped
    }

    /// Shared installation routine: re-check admissibility, clear the
    /// prior goal, push a fresh one, record the commitment.
    pub fn install(
        &mut self,
        ctx: &AgentContext,
        env: &mut InstallEnv<'_>,
    ) -> Result<InstallOutcome, InstallError> {
        let agent_id = ctx.agent_id;
        let current = env.stack.current().map(|g| g.category);
        let score = self
            .memory
            .get(&agent_id)
            .map(|m| m.last_desirability)
            .unwrap_or(0.0);

        let decision = env.commitment.evaluate_switch(
            agent_id,
            self.category,
            score,
            current,
            &ctx.clock,
            env.urgency,
        );
        if !decision.allow {
            return Ok(InstallOutcome::Denied(decision.reason));
        }

        env.stack.clear();
        env.stack.push(Goal::new(self.category, ctx.clock.now_ms))?;

        let thrash_warning =
            env.commitment
                .record_commitment(agent_id, self.category, score, &ctx.clock);
        self.memory(agent_id).last_goal_start_ms = Some(ctx.clock.now_ms);

        Ok(InstallOutcome::Installed { thrash_warning })
    }

    /// Shared goal-end bookkeeping: cooldown timestamp and the
    /// consecutive-failure counter.
    pub fn record_goal_end(&mut self, agent_id: AgentId, status: GoalStatus, clock: &TickClock) {
        let mem = self.memory.entry(agent_id).or_default();
        mem.last_goal_end_ms = Some(clock.now_ms);
        if status == GoalStatus::Failed {
            mem.consecutive_failures = mem.consecutive_failures.saturating_add(1);
        } else {
            mem.consecutive_failures = 0;
        }
    }

    pub fn forget(&mut self, agent_id: AgentId) {
        self.memory.remove(&agent_id);
    }
}
