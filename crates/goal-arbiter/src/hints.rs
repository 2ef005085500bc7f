//! Situational priority hints.
//!
//! Before scoring, the arbitrator condenses the context into four coarse
//! hints in `[0, 1]`. Evaluators see them as a multiplicative factor of
//! `0.5 + hint`, so a hint of 0.5 is neutral, 0 halves a score, and 1
//! multiplies by 1.5. Hints guide the evaluators; they never pick a
//! winner on their own.

use agent_context::{clamp01, AgentContext, GoalCategory};

/// Coarse per-theme priority hints, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityHints {
    pub attack: f64,
    pub health: f64,
    pub ammo: f64,
    pub explore: f64,
}

impl PriorityHints {
    /// All hints at the neutral value.
    pub fn neutral() -> Self {
        Self {
            attack: 0.5,
            health: 0.5,
            ammo: 0.5,
            explore: 0.5,
        }
    }

    /// Derives hints from the context.
    ///
    /// `engage_ready` is false during the reaction delay right after a
    /// target first becomes visible; until it elapses the attack hint is
    /// capped so freshly spotted targets do not cause instant snap
    /// engagement.
    pub fn from_context(ctx: &AgentContext, engage_ready: bool, attack_hint_cap: f64) -> Self {
        let health_ratio = ctx.health_ratio();
        let ammo_ratio = ctx.ammo_ratio();
        let aggression = ctx.personality.aggression();

        let mut attack = if ctx.target_visible() {
            clamp01(0.7 + aggression * 0.3)
        } else if ctx.target.is_some() {
            0.5
        } else {
            0.2
        };
        if !engage_ready {
            attack = attack.min(clamp01(attack_hint_cap));
        }

        let health = if health_ratio < 0.3 {
            0.9
        } else {
            clamp01(0.5 + (1.0 - health_ratio) * 0.3)
        };

        let ammo = if ammo_ratio <= 0.0 && ctx.target.is_some() {
            0.95
        } else {
            clamp01(0.4 + (1.0 - ammo_ratio) * 0.4)
        };

        let explore = if ctx.target_visible() {
            0.15
        } else if ctx.target.is_some() || ctx.threat_count > 0 {
            0.3
        } else {
            0.6
        };

        Self {
            attack,
            health,
            ammo,
            explore,
        }
    }

    /// The hint backing a category's theme.
    pub fn for_category(&self, category: GoalCategory) -> f64 {
        match category {
            GoalCategory::Attack | GoalCategory::Flank | GoalCategory::Hunt => self.attack,
            GoalCategory::GetHealth | GoalCategory::TakeCover | GoalCategory::Retreat => {
                self.health
            }
            GoalCategory::GetAmmo | GoalCategory::GetWeapon => self.ammo,
            GoalCategory::Explore => self.explore,
        }
    }

    /// Multiplicative score factor for a category, in `[0.5, 1.5]`.
    pub fn factor_for(&self, category: GoalCategory) -> f64 {
        0.5 + clamp01(self.for_category(category))
    }
}

impl Default for PriorityHints {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_context::{AgentId, TickClock};

    fn ctx() -> AgentContext {
        AgentContext::new(AgentId(1), TickClock::new(5, 2_000))
    }

    #[test]
    fn test_visible_target_boosts_attack_suppresses_explore() {
        let hints = PriorityHints::from_context(&ctx().with_visible_target(10.0), true, 0.6);
        assert!(hints.attack > 0.8);
        assert_eq!(hints.explore, 0.15);
    }

    #[test]
    fn test_no_target_favors_explore() {
        let hints = PriorityHints::from_context(&ctx(), true, 0.6);
        assert_eq!(hints.attack, 0.2);
        assert_eq!(hints.explore, 0.6);
    }

    #[test]
    fn test_reaction_delay_caps_attack() {
        let c = ctx().with_visible_target(10.0);
        let ready = PriorityHints::from_context(&c, true, 0.6);
        let waiting = PriorityHints::from_context(&c, false, 0.6);
        assert!(waiting.attack <= 0.6);
        assert!(waiting.attack < ready.attack);
    }

    #[test]
    fn test_low_health_raises_health_hint() {
        let hints = PriorityHints::from_context(&ctx().with_health(20.0, 100.0), true, 0.6);
        assert_eq!(hints.health, 0.9);
    }

    #[test]
    fn test_empty_ammo_with_target_spikes_ammo_hint() {
        let c = ctx().with_visible_target(8.0).with_ammo(0.0, 30.0);
        let hints = PriorityHints::from_context(&c, true, 0.6);
        assert_eq!(hints.ammo, 0.95);
    }

    #[test]
    fn test_factor_range() {
        let hints = PriorityHints {
            attack: 0.0,
            health: 1.0,
            ammo: 0.5,
            explore: 2.0, // out of range on purpose
        };
        assert_eq!(hints.factor_for(GoalCategory::Attack), 0.5);
        assert_eq!(hints.factor_for(GoalCategory::GetHealth), 1.5);
        assert_eq!(hints.factor_for(GoalCategory::GetAmmo), 1.0);
        assert_eq!(hints.factor_for(GoalCategory::Explore), 1.5);
    }
}
