//! Combat evaluators: Attack, Flank, Hunt.
//!
//! All three need a target in some form. Attack wants a live, visible
//! (or just-lost, within the grace window) target it can shoot; Flank
//! wants the same plus enough health to expose itself; Hunt takes over
//! once the target slips out of sight but is still fresh in memory.

use agent_context::{clamp01, AgentContext, AgentId, GoalCategory, GoalStatus, TickClock};

use crate::config::EvaluatorConfig;
use crate::error::InstallError;
use crate::evaluator::{EvaluatorCore, GoalEvaluator, InstallEnv, InstallOutcome, ScoringEnv};

/// Scoring factor constants for the combat evaluators.
pub mod factors {
    /// Distance beyond which a target is not worth engaging directly
    pub const ENGAGE_RANGE: f64 = 40.0;
    /// Attack base desirability before modifiers
    pub const ATTACK_BASE: f64 = 0.35;
    /// How much aggression adds to attack desirability
    pub const ATTACK_AGGRESSION: f64 = 0.45;
    /// How much target proximity adds to attack desirability
    pub const ATTACK_CLOSENESS: f64 = 0.2;
    /// Multiplier while the target is inside the visibility grace window
    pub const UNSEEN_GRACE: f64 = 0.6;
    /// Flanking is pointless closer than this
    pub const FLANK_MIN_RANGE: f64 = 8.0;
    /// Flank base desirability before traits
    pub const FLANK_BASE: f64 = 0.2;
    /// Hunt base desirability before traits
    pub const HUNT_BASE: f64 = 0.3;
}

fn closeness(ctx: &AgentContext) -> f64 {
    match ctx.target_distance() {
        Some(d) => 1.0 - clamp01(d / factors::ENGAGE_RANGE),
        None => 0.0,
    }
}

/// Scores direct engagement of the current target.
pub struct AttackEvaluator {
    core: EvaluatorCore,
}

impl AttackEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::Attack, config),
        }
    }
}

impl GoalEvaluator for AttackEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if ctx.target_died || self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }
        if !self
            .core
            .target_retained(ctx, env.config.visibility_grace_frames)
        {
            return self.core.zero(agent);
        }
        if !ctx.can_shoot() {
            return self.core.zero(agent);
        }

        let aggression = ctx.personality.aggression();
        let mut raw = factors::ATTACK_BASE
            + aggression * factors::ATTACK_AGGRESSION
            + closeness(ctx) * factors::ATTACK_CLOSENESS;

        // Wounded agents press the attack less; empty magazines even less.
        raw *= 0.3 + 0.7 * ctx.health_ratio();
        raw *= 0.5 + 0.5 * ctx.ammo_ratio();
        if !ctx.target_visible() {
            raw *= factors::UNSEEN_GRACE;
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

/// Scores circling around to attack the target from the side.
pub struct FlankEvaluator {
    core: EvaluatorCore,
}

impl FlankEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::Flank, config),
        }
    }
}

impl GoalEvaluator for FlankEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if ctx.target_died || self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }
        if !self
            .core
            .target_retained(ctx, env.config.visibility_grace_frames)
        {
            return self.core.zero(agent);
        }
        // Flanking exposes the agent; too hurt means not at all.
        if ctx.health_ratio() < env.config.exposure_health_floor {
            return self.core.zero(agent);
        }
        if !ctx.can_shoot() {
            return self.core.zero(agent);
        }

        let p = &ctx.personality;
        let mut raw = factors::FLANK_BASE + 0.3 * p.aggression() + 0.3 * p.adaptability();
        raw *= 0.5 + 0.5 * ctx.health_ratio();
        if ctx
            .target_distance()
            .map(|d| d < factors::FLANK_MIN_RANGE)
            .unwrap_or(false)
        {
            raw *= 0.5;
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

/// Scores seeking out a target that slipped out of sight recently.
pub struct HuntEvaluator {
    core: EvaluatorCore,
}

impl HuntEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::Hunt, config),
        }
    }
}

impl GoalEvaluator for HuntEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if ctx.target_died || self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }
        // Hunt only applies to a known target that is currently unseen.
        if ctx.target.is_none() || ctx.target_visible() {
            return self.core.zero(agent);
        }
        let since_seen = match ctx.ms_since_target_seen() {
            Some(ms) if ms <= env.config.target_lost_timeout_ms => ms,
            _ => return self.core.zero(agent),
        };

        let freshness = 1.0 - since_seen as f64 / env.config.target_lost_timeout_ms as f64;
        let mut raw =
            factors::HUNT_BASE + 0.3 * ctx.personality.aggression() + 0.2 * clamp01(freshness);
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
