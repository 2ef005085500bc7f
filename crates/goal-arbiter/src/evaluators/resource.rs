//! Resource evaluators: GetHealth, GetAmmo, GetWeapon.
//!
//! Each scores the urge to go pick something up. When the needed pickup
//! exists nowhere in the world the category is heavily discounted rather
//! than zeroed, so it survives as a fallback.

use agent_context::{AgentContext, AgentId, GoalCategory, GoalStatus, TickClock};

use crate::config::EvaluatorConfig;
use crate::error::InstallError;
use crate::evaluator::{EvaluatorCore, GoalEvaluator, InstallEnv, InstallOutcome, ScoringEnv};

/// Scoring factor constants for the resource evaluators.
pub mod factors {
    /// Health ratio above which seeking health scores nothing
    pub const HEALTH_SATISFIED: f64 = 0.9;
    /// Extra desirability per unit of emergency deficit
    pub const HEALTH_ESCALATION: f64 = 0.8;
    /// Flat boost the moment health crosses the emergency line, so
    /// healing outranks hiding even when both are screaming
    pub const HEALTH_EMERGENCY_BOOST: f64 = 0.5;
    /// Ammo ratio above which seeking ammo scores nothing
    pub const AMMO_SATISFIED: f64 = 0.95;
    /// Bonus when nearly dry with a target around
    pub const AMMO_COMBAT_URGENCY: f64 = 0.3;
    /// Ammo ratio below which the combat urgency bonus applies
    pub const AMMO_LOW: f64 = 0.25;
    /// Base desirability of picking up a first weapon
    pub const WEAPON_MISSING: f64 = 0.8;
    /// Base desirability of replacing a weapon that is not ready
    pub const WEAPON_NOT_READY: f64 = 0.35;
}

/// Scores seeking out a health pickup.
pub struct GetHealthEvaluator {
    core: EvaluatorCore,
}

impl GetHealthEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::GetHealth, config),
        }
    }
}

impl GoalEvaluator for GetHealthEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }
        let hr = ctx.health_ratio();
        if hr >= factors::HEALTH_SATISFIED {
            return self.core.zero(agent);
        }

        let mut raw = (1.0 - hr) * (0.5 + 0.5 * ctx.personality.caution());
        // Below the emergency line the score escalates past 1.0.
        let emergency = env.config.emergency_health_ratio;
        if hr <= emergency && emergency > 0.0 {
            raw += factors::HEALTH_EMERGENCY_BOOST
                + (emergency - hr) / emergency * factors::HEALTH_ESCALATION;
        }
        if !ctx.world.health_pickups {
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

/// Scores seeking out an ammo pickup.
pub struct GetAmmoEvaluator {
    core: EvaluatorCore,
}

impl GetAmmoEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::GetAmmo, config),
        }
    }
}

impl GoalEvaluator for GetAmmoEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }
        // Without a weapon there is nothing to load.
        if !ctx.has_weapon {
            return self.core.zero(agent);
        }
        let ar = ctx.ammo_ratio();
        if ar >= factors::AMMO_SATISFIED {
            return self.core.zero(agent);
        }

        let p = &ctx.personality;
        let mut raw = (1.0 - ar) * (0.4 + 0.3 * p.caution() + 0.2 * p.accuracy());
        if ctx.target.is_some() && ar < factors::AMMO_LOW {
            raw += factors::AMMO_COMBAT_URGENCY;
        }
        if !ctx.world.ammo_pickups {
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

/// Scores seeking out a weapon pickup.
pub struct GetWeaponEvaluator {
    core: EvaluatorCore,
}

impl GetWeaponEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            core: EvaluatorCore::from_config(GoalCategory::GetWeapon, config),
        }
    }
}

impl GoalEvaluator for GetWeaponEvaluator {
    fn category(&self) -> GoalCategory {
        self.core.category()
    }

    fn desirability(&mut self, ctx: &AgentContext, env: &ScoringEnv<'_>) -> f64 {
        let agent = ctx.agent_id;
        if self.core.on_cooldown(agent, &ctx.clock, env.config) {
            return self.core.zero(agent);
        }
        if ctx.has_weapon && ctx.weapon_ready {
            return self.core.zero(agent);
        }

        let mut raw = if ctx.has_weapon {
            factors::WEAPON_NOT_READY
        } else {
            factors::WEAPON_MISSING
        };
        raw *= 0.7 + 0.3 * ctx.personality.adaptability();
        if !ctx.world.weapon_pickups {
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
