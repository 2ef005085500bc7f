//! Explore evaluator: the low-priority default behavior.
//!
//! Explore keeps a small baseline score in almost every situation, so
//! an agent with nothing better to do always has somewhere to go. It is
//! also the category failure recovery falls back to.

use agent_context::{AgentContext, AgentId, GoalCategory, GoalStatus, TickClock};

use crate::config::EvaluatorConfig;
use crate::error::InstallError;
use crate::evaluator::{EvaluatorCore, GoalEvaluator, InstallEnv, InstallOutcome, ScoringEnv};

/// Scoring factor constants for exploration.
pub mod factors {
    /// Baseline desirability of wandering
    pub const EXPLORE_BASE: f64 = 0.25;
    /// How much adaptability adds to wandering
    pub const EXPLORE_ADAPTABILITY: f64 = 0.15;
    /// Extra urge to move when stuck in place
    pub const STUCK_NUDGE: f64 = 0.1;
}

/// Scores wandering the world looking for something to do.
pub struct ExploreEvaluator {
    core: EvaluatorCore,
}

impl ExploreEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::Explore, config),
        }
    }
}

impl GoalEvaluator for ExploreEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }

        let mut raw =
            factors::EXPLORE_BASE + factors::EXPLORE_ADAPTABILITY * ctx.personality.adaptability();
        if ctx.stuck {
            raw += factors::STUCK_NUDGE;
        }
        raw *= self.core.failure_discount(agent);

        self.core.shape(raw, ctx, env)
    }

    fn install_goal(
        &mut self,
        ctx: &AgentContext,
        env: &mut InstallEnv<'_>,
    ) -> Result<InstallOutcome, InstallError> {
        self.core.install(ctx, env)
    }

    fn on_goal_end(&mut self, agent_id: AgentId, status: GoalStatus, clock: &TickClock) {
        self.core.record_goal_end(agent_id, status, clock);
    }

    fn forget_agent(&mut self, agent_id: AgentId) {
        self.core.forget(agent_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::CommitmentManager;
    use crate::hints::PriorityHints;
    use agent_context::{AgentId, TickClock};

    const AGENT: AgentId = AgentId(1);

    fn ctx(now_ms: u64) -> AgentContext {
        AgentContext::new(AGENT, TickClock::new(now_ms / 16, now_ms))
    }

    #[test]
    fn test_explore_always_has_a_baseline() {
        let hints = PriorityHints::neutral();
        let commitment = CommitmentManager::with_defaults();
        let config = EvaluatorConfig::default();
        let mut explore = ExploreEvaluator::new(&config);

        let env = ScoringEnv {
            hints: &hints,
            commitment: &commitment,
            config: &config,
            current_category: None,
        };
        assert!(explore.desirability(&ctx(0), &env) > 0.0);
        // Even a wounded, threatened agent can still wander.
        let grim = ctx(0).with_health(10.0, 100.0).with_threats(5);
        assert!(explore.desirability(&grim, &env) > 0.0);
    }

    #[test]
    fn test_stuck_nudges_explore_up() {
        let hints = PriorityHints::neutral();
        let commitment = CommitmentManager::with_defaults();
        let config = EvaluatorConfig::default();
        let mut explore = ExploreEvaluator::new(&config);
        let env = ScoringEnv {
            hints: &hints,
            commitment: &commitment,
            config: &config,
            current_category: None,
        };

        let free = explore.desirability(&ctx(5_000), &env);
        let stuck = explore.desirability(&ctx(5_000).with_stuck_since(3_000), &env);
        assert!(stuck > free);
    }
}
