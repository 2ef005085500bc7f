//! Survival evaluators: TakeCover and Retreat.
//!
//! Both respond to pressure rather than opportunity: recent damage,
//! sensed threats, and low health drive them up; a quiet world keeps
//! them at zero.

use agent_context::{clamp01, AgentContext, AgentId, GoalCategory, GoalStatus, TickClock};

use crate::config::EvaluatorConfig;
use crate::error::InstallError;
use crate::evaluator::{EvaluatorCore, GoalEvaluator, InstallEnv, InstallOutcome, ScoringEnv};

/// Scoring factor constants for the survival evaluators.
pub mod factors {
    /// Damage older than this no longer pressures cover seeking (ms)
    pub const DAMAGE_MEMORY_MS: u64 = 3_000;
    /// TakeCover base desirability under any pressure
    pub const COVER_BASE: f64 = 0.2;
    /// Threat count at which the threat factor saturates
    pub const THREAT_SATURATION: u32 = 3;
    /// Health ratio above which retreating scores nothing
    pub const RETREAT_HEALTH_CEILING: f64 = 0.5;
}

fn damage_recency(ctx: &AgentContext) -> f64 {
    match ctx.ms_since_damage() {
        Some(ms) if ms < factors::DAMAGE_MEMORY_MS => {
            1.0 - ms as f64 / factors::DAMAGE_MEMORY_MS as f64
        }
        _ => 0.0,
    }
}

fn threat_factor(ctx: &AgentContext) -> f64 {
    clamp01(ctx.threat_count.min(factors::THREAT_SATURATION) as f64
        / factors::THREAT_SATURATION as f64)
}

/// Scores getting behind cover while under pressure.
pub struct TakeCoverEvaluator {
    core: EvaluatorCore,
}

impl TakeCoverEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::TakeCover, config),
        }
    }
}

impl GoalEvaluator for TakeCoverEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }
        // No pressure of any kind: nothing to hide from.
        let recency = damage_recency(ctx);
        if ctx.threat_count == 0 && ctx.target.is_none() && recency <= 0.0 {
            return self.core.zero(agent);
        }

        let mut raw = factors::COVER_BASE
            + 0.35 * ctx.personality.caution()
            + 0.15 * threat_factor(ctx)
            + 0.3 * recency
            + 0.4 * (1.0 - ctx.health_ratio());
        if !ctx.world.cover_points {
            raw *= env.config.resource_fallback_discount;
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

/// Scores breaking contact and falling back while badly hurt.
pub struct RetreatEvaluator {
    core: EvaluatorCore,
}

impl RetreatEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::Retreat, config),
        }
    }
}

impl GoalEvaluator for RetreatEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }
        let hr = ctx.health_ratio();
        if hr >= factors::RETREAT_HEALTH_CEILING {
            return self.core.zero(agent);
        }
        if !ctx.target_visible() && ctx.threat_count == 0 {
            return self.core.zero(agent);
        }

        let mut raw = (1.0 - hr) * (0.5 + 0.5 * ctx.personality.caution())
            + 0.1 * ctx.threat_count.min(factors::THREAT_SATURATION) as f64;
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

    struct Fixture {
        hints: PriorityHints,
        commitment: CommitmentManager,
        config: EvaluatorConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                hints: PriorityHints::neutral(),
                commitment: CommitmentManager::with_defaults(),
                config: EvaluatorConfig::default(),
            }
        }

        fn env(&self) -> ScoringEnv<'_> {
            ScoringEnv {
                hints: &self.hints,
                commitment: &self.commitment,
                config: &self.config,
                current_category: None,
            }
        }
    }

    #[test]
    fn test_cover_zero_when_unpressured() {
        let fx = Fixture::new();
        let mut cover = TakeCoverEvaluator::new(&fx.config);
        assert_eq!(cover.desirability(&ctx(10_000), &fx.env()), 0.0);
    }

    #[test]
    fn test_cover_responds_to_recent_damage() {
        let fx = Fixture::new();
        let mut cover = TakeCoverEvaluator::new(&fx.config);

        let fresh = ctx(10_000).with_damage_at(9_800).with_health(60.0, 100.0);
        let fresh_score = cover.desirability(&fresh, &fx.env());
        assert!(fresh_score > 0.0);

        let fading = ctx(10_000).with_damage_at(7_500).with_health(60.0, 100.0);
        assert!(cover.desirability(&fading, &fx.env()) < fresh_score);

        // Damage past the memory window alone no longer pressures.
        let old = ctx(10_000).with_damage_at(2_000);
        assert_eq!(cover.desirability(&old, &fx.env()), 0.0);
    }

    #[test]
    fn test_cover_scales_with_threats() {
        let fx = Fixture::new();
        let mut cover = TakeCoverEvaluator::new(&fx.config);
        let one = cover.desirability(&ctx(0).with_threats(1), &fx.env());
        let three = cover.desirability(&ctx(0).with_threats(3), &fx.env());
        assert!(three > one);
    }

    #[test]
    fn test_cover_discounted_without_cover_points() {
        use agent_context::WorldResources;

        let fx = Fixture::new();
        let mut cover = TakeCoverEvaluator::new(&fx.config);
        let open_field = ctx(0).with_threats(2).with_world(WorldResources {
            cover_points: false,
            ..WorldResources::default()
        });
        let sheltered = ctx(0).with_threats(2);
        let discounted = cover.desirability(&open_field, &fx.env());
        let full = cover.desirability(&sheltered, &fx.env());
        assert!(discounted > 0.0);
        assert!(discounted < full * 0.25);
    }

    #[test]
    fn test_retreat_needs_low_health_and_contact() {
        let fx = Fixture::new();
        let mut retreat = RetreatEvaluator::new(&fx.config);

        // Healthy: never retreat.
        assert_eq!(
            retreat.desirability(&ctx(0).with_visible_target(10.0), &fx.env()),
            0.0
        );
        // Hurt but nothing around: nothing to retreat from.
        assert_eq!(
            retreat.desirability(&ctx(0).with_health(30.0, 100.0), &fx.env()),
            0.0
        );
        // Hurt and in contact: retreat scores.
        let pressed = ctx(0).with_health(30.0, 100.0).with_visible_target(10.0);
        assert!(retreat.desirability(&pressed, &fx.env()) > 0.0);
    }

    #[test]
    fn test_retreat_scales_with_wounds() {
        let fx = Fixture::new();
        let mut retreat = RetreatEvaluator::new(&fx.config);
        let bad = ctx(0).with_health(10.0, 100.0).with_visible_target(10.0);
        let mild = ctx(0).with_health(45.0, 100.0).with_visible_target(10.0);
        assert!(retreat.desirability(&bad, &fx.env()) > retreat.desirability(&mild, &fx.env()));
    }
}
