//! Per-agent arbitration tick.
//!
//! One `Arbitrator` per agent. The host samples its clock once per
//! simulation tick, builds an [`AgentContext`], and calls
//! [`Arbitrator::tick`]. The arbitrator gates how often full
//! re-arbitration runs (faster when the situation is hot), detects
//! critical situations that must not wait for the next interval, and
//! hands the actual scoring to the injected selector. All failures are
//! contained; repeated failures recover to the exploration fallback.

use std::collections::VecDeque;

use agent_context::{AgentContext, AgentId, DiagnosticEvent, GoalCategory, TickClock};

use crate::commitment::{CommitmentManager, SwitchUrgency};
use crate::config::{ArbiterConfig, ArbitrationConfig};
use crate::deferred::DeferredQueue;
use crate::error::SelectionError;
use crate::evaluator::EvaluatorSet;
use crate::hints::PriorityHints;
use crate::selection::{GoalSelector, SelectionReport};
use crate::stack::{Goal, GoalStack};
use crate::telemetry::{TelemetryLog, TelemetrySink};

/// Coarse classification of how urgent an agent's situation is.
///
/// Ordered hottest first; hotter classes re-arbitrate more often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SituationClass {
    Critical,
    Combat,
    Damaged,
    Alert,
    Exploring,
    Safe,
}

impl SituationClass {
    /// Classifies the context. `current` is the active goal category,
    /// used only to tell an exploring idle agent from a parked one.
    pub fn classify(
        ctx: &AgentContext,
        current: Option<GoalCategory>,
        config: &ArbitrationConfig,
    ) -> Self {
        if ctx.health_ratio() <= config.emergency_health_ratio
            || ctx.threat_count >= config.multiple_threat_count
        {
            return SituationClass::Critical;
        }
        if ctx.target_visible() {
            return SituationClass::Combat;
        }
        if ctx.health_ratio() < config.damaged_health_ratio {
            return SituationClass::Damaged;
        }
        let recently_hit = ctx
            .ms_since_damage()
            .map(|ms| ms < config.recent_damage_ms)
            .unwrap_or(false);
        if recently_hit || ctx.target.is_some() || ctx.stuck || ctx.threat_count > 0 {
            return SituationClass::Alert;
        }
        if current == Some(GoalCategory::Explore) {
            SituationClass::Exploring
        } else {
            SituationClass::Safe
        }
    }

    /// Re-arbitration interval for this class.
    pub fn interval_ms(self, config: &ArbitrationConfig) -> u64 {
        match self {
            SituationClass::Critical => config.critical_interval_ms,
            SituationClass::Combat => config.combat_interval_ms,
            SituationClass::Damaged => config.damaged_interval_ms,
            SituationClass::Alert => config.alert_interval_ms,
            SituationClass::Exploring => config.exploring_interval_ms,
            SituationClass::Safe => config.safe_interval_ms,
        }
    }
}

/// A condition that must not wait for the next scheduled interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticalOverride {
    /// Health at or below the emergency floor.
    EmergencyHealth,
    /// The active goal needs ammo the agent no longer has.
    AmmoExhausted,
    /// The active goal's target is dead.
    TargetDied,
    /// The agent has been stuck past the override threshold.
    StuckTooLong,
    /// Too many simultaneous threats.
    MultipleThreats,
}

/// What one call to [`Arbitrator::tick`] did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Second call within the same simulation tick; nothing ran.
    SameTick,
    /// Not due yet and no override fired.
    Waiting { next_eval_ms: u64 },
    /// A full arbitration pass ran.
    Arbitrated {
        situation: SituationClass,
        overridden: Option<CriticalOverride>,
        report: SelectionReport,
    },
    /// The pass failed but the failure was contained.
    Faulted { consecutive_failures: u32 },
    /// Repeated failures forced the exploration fallback.
    Recovered { fallback: GoalCategory },
}

enum Reaction {
    EngageReady,
}

/// Per-agent tick orchestrator.
pub struct Arbitrator {
    agent_id: AgentId,
    config: ArbiterConfig,
    last_tick: Option<u64>,
    next_eval_ms: u64,
    situation_cache: Option<(SituationClass, u64)>,
    consecutive_failures: u32,
    transitions: VecDeque<(GoalCategory, u64)>,
    last_thrash_diag_ms: Option<u64>,
    reactions: DeferredQueue<Reaction>,
    engage_ready: bool,
    target_was_visible: bool,
}

impl Arbitrator {
    pub fn new(agent_id: AgentId, config: ArbiterConfig) -> Self {
        Self {
            agent_id,
            config,
            last_tick: None,
            next_eval_ms: 0,
            situation_cache: None,
            consecutive_failures: 0,
            transitions: VecDeque::new(),
            last_thrash_diag_ms: None,
            reactions: DeferredQueue::new(),
            engage_ready: false,
            target_was_visible: false,
        }
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Resets all transient state, e.g. on respawn. Configuration is
    /// kept.
    pub fn reset(&mut self) {
        self.last_tick = None;
        self.next_eval_ms = 0;
        self.situation_cache = None;
        self.consecutive_failures = 0;
        self.transitions.clear();
        self.last_thrash_diag_ms = None;
        self.reactions.clear();
        self.engage_ready = false;
        self.target_was_visible = false;
    }

    /// Runs one arbitration tick.
    ///
    /// Re-entrant per simulation tick: a second call with the same
    /// `ctx.clock.tick` is a no-op, so arbitration stays idempotent
    /// within a frame no matter how many systems poke it.
    pub fn tick<S: TelemetrySink>(
        &mut self,
        ctx: &AgentContext,
        evaluators: &mut EvaluatorSet,
        selector: &mut dyn GoalSelector,
        stack: &mut dyn GoalStack,
        commitment: &mut CommitmentManager,
        telemetry: &mut TelemetryLog<S>,
    ) -> TickOutcome {
        let clock = ctx.clock;
        if self.last_tick == Some(clock.tick) {
            return TickOutcome::SameTick;
        }
        self.last_tick = Some(clock.tick);

        self.drain_reactions(ctx);
        self.retire_finished_goal(ctx, evaluators, stack, commitment);

        // Opportunistic; rate-limits itself.
        commitment.sweep(&clock);

        let situation = self.situation(ctx, stack.current().map(|g| g.category));
        let overridden = self.critical_override(ctx, stack.current().map(|g| g.category));

        if overridden.is_none() && clock.now_ms < self.next_eval_ms {
            return TickOutcome::Waiting {
                next_eval_ms: self.next_eval_ms,
            };
        }

        let hints = PriorityHints::from_context(
            ctx,
            self.engage_ready,
            self.config.arbitration.pre_engage_attack_hint_cap,
        );
        let urgency = match (overridden, situation) {
            (Some(_), _) => SwitchUrgency::Override,
            (None, SituationClass::Critical) => SwitchUrgency::CriticalSituation,
            _ => SwitchUrgency::Normal,
        };

        let result = selector.select(
            ctx,
            evaluators,
            &hints,
            urgency,
            stack,
            commitment,
            &self.config.evaluators,
        );
        self.next_eval_ms = clock.now_ms + situation.interval_ms(&self.config.arbitration);

        match result {
            Ok(report) => {
                self.consecutive_failures = 0;
                self.after_selection(ctx, stack, commitment, telemetry, &report);
                TickOutcome::Arbitrated {
                    situation,
                    overridden,
                    report,
                }
            }
            Err(err) => self.handle_failure(ctx, evaluators, stack, commitment, telemetry, err),
        }
    }

    /// Drops all per-agent state held by the collaborators for this
    /// agent. Call when the agent is destroyed.
    pub fn teardown<S: TelemetrySink>(
        &mut self,
        evaluators: &mut EvaluatorSet,
        commitment: &mut CommitmentManager,
        telemetry: &mut TelemetryLog<S>,
    ) {
        for evaluator in evaluators.iter_mut() {
            evaluator.forget_agent(self.agent_id);
        }
        commitment.remove_agent(self.agent_id);
        telemetry.forget_agent(self.agent_id);
        self.reset();
    }

    fn situation(&mut self, ctx: &AgentContext, current: Option<GoalCategory>) -> SituationClass {
        let now = ctx.clock.now_ms;
        if let Some((cached, at)) = self.situation_cache {
            if now.saturating_sub(at) <= self.config.arbitration.situation_ttl_ms {
                return cached;
            }
        }
        let class = SituationClass::classify(ctx, current, &self.config.arbitration);
        self.situation_cache = Some((class, now));
        class
    }

    fn critical_override(
        &self,
        ctx: &AgentContext,
        current: Option<GoalCategory>,
    ) -> Option<CriticalOverride> {
        let cfg = &self.config.arbitration;
        if ctx.health_ratio() <= cfg.emergency_health_ratio {
            return Some(CriticalOverride::EmergencyHealth);
        }
        if let Some(category) = current {
            if category.requires_ammo() && ctx.ammo_ratio() <= 0.0 {
                return Some(CriticalOverride::AmmoExhausted);
            }
            if category.requires_target() && ctx.target_died {
                return Some(CriticalOverride::TargetDied);
            }
        }
        if ctx.stuck_duration_ms() >= cfg.stuck_override_ms {
            return Some(CriticalOverride::StuckTooLong);
        }
        if ctx.threat_count >= cfg.multiple_threat_count {
            return Some(CriticalOverride::MultipleThreats);
        }
        None
    }

    /// Moves reaction-delay state along: a target becoming visible
    /// schedules an engage-ready event instead of flipping instantly.
    /// Sharper agents react sooner.
    fn drain_reactions(&mut self, ctx: &AgentContext) {
        for reaction in self.reactions.drain_due(ctx.clock.now_ms) {
            match reaction {
                Reaction::EngageReady => self.engage_ready = true,
            }
        }

        let visible = ctx.target_visible();
        if visible && !self.target_was_visible {
            self.engage_ready = false;
            let base = self.config.arbitration.reaction_delay_ms as f64;
            let delay = (base * (1.5 - 0.5 * ctx.personality.accuracy())) as u64;
            self.reactions
                .schedule(ctx.clock.now_ms + delay, Reaction::EngageReady);
        } else if ctx.target.is_none() {
            self.engage_ready = false;
            self.reactions.clear();
        }
        self.target_was_visible = visible;
    }

    fn retire_finished_goal(
        &mut self,
        ctx: &AgentContext,
        evaluators: &mut EvaluatorSet,
        stack: &mut dyn GoalStack,
        commitment: &mut CommitmentManager,
    ) {
        let Some(goal) = stack.current() else {
            return;
        };
        if !goal.status.is_finished() {
            return;
        }
        let (category, status) = (goal.category, goal.status);
        if let Some(evaluator) = evaluators.iter_mut().find(|e| e.category() == category) {
            evaluator.on_goal_end(self.agent_id, status, &ctx.clock);
        }
        stack.clear();
        commitment.clear_commitment(self.agent_id, &ctx.clock);
    }

    fn after_selection<S: TelemetrySink>(
        &mut self,
        ctx: &AgentContext,
        stack: &mut dyn GoalStack,
        commitment: &mut CommitmentManager,
        telemetry: &mut TelemetryLog<S>,
        report: &SelectionReport,
    ) {
        let clock = ctx.clock;

        if let Some(warning) = report.thrash_warning.clone() {
            telemetry.emit(clock.now_ms, warning);
        }

        if let Some(category) = report.installed {
            let score = report
                .scores
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, s)| *s)
                .unwrap_or(0.0);
            telemetry.emit(
                clock.now_ms,
                DiagnosticEvent::GoalCommitted {
                    agent_id: self.agent_id,
                    category,
                    score,
                    tick: clock.tick,
                },
            );
            self.record_transition(category, &clock, telemetry);
        }

        // Keep the incumbent's observed score fresh so hysteresis
        // compares against current desirability, not a stale peak.
        if let Some(goal) = stack.current() {
            if let Some(&(_, score)) = report.scores.iter().find(|(c, _)| *c == goal.category) {
                commitment.update_current_score(self.agent_id, score, &clock);
            }
        }
    }

    /// Records a transition in the ring and raises a thrash diagnostic
    /// when the window fills up. This watches completed transitions,
    /// complementing the commitment manager's switch-attempt view.
    fn record_transition<S: TelemetrySink>(
        &mut self,
        category: GoalCategory,
        clock: &TickClock,
        telemetry: &mut TelemetryLog<S>,
    ) {
        let cfg = &self.config.arbitration;
        self.transitions.push_back((category, clock.now_ms));
        while self.transitions.len() > cfg.transition_history {
            self.transitions.pop_front();
        }

        let cutoff = clock.now_ms.saturating_sub(cfg.thrash_window_ms);
        let recent = self
            .transitions
            .iter()
            .filter(|(_, at)| *at >= cutoff)
            .count();
        if recent < cfg.thrash_threshold {
            return;
        }
        let cooled = self
            .last_thrash_diag_ms
            .map(|last| clock.now_ms.saturating_sub(last) >= cfg.thrash_diag_cooldown_ms)
            .unwrap_or(true);
        if !cooled {
            return;
        }
        self.last_thrash_diag_ms = Some(clock.now_ms);
        telemetry.emit(
            clock.now_ms,
            DiagnosticEvent::ThrashWarning {
                agent_id: self.agent_id,
                switch_count: recent,
                window_ms: cfg.thrash_window_ms,
                tick: clock.tick,
            },
        );
    }

    fn handle_failure<S: TelemetrySink>(
        &mut self,
        ctx: &AgentContext,
        evaluators: &mut EvaluatorSet,
        stack: &mut dyn GoalStack,
        commitment: &mut CommitmentManager,
        telemetry: &mut TelemetryLog<S>,
        err: SelectionError,
    ) -> TickOutcome {
        let clock = ctx.clock;
        self.consecutive_failures += 1;
        // The detail string only gets formatted if a sink is listening.
        telemetry.emit_with(clock.now_ms, || DiagnosticEvent::ArbitrationFault {
            agent_id: self.agent_id,
            detail: err.to_string(),
            consecutive_failures: self.consecutive_failures,
            tick: clock.tick,
        });
        tracing::warn!(
            agent = %self.agent_id,
            failures = self.consecutive_failures,
            error = %err,
            "arbitration pass failed"
        );

        if self.consecutive_failures < self.config.arbitration.failure_recovery_threshold {
            return TickOutcome::Faulted {
                consecutive_failures: self.consecutive_failures,
            };
        }

        // Known-good fallback: tear everything down and park on explore.
        let fallback = GoalCategory::fallback();
        stack.clear();
        commitment.clear_commitment(self.agent_id, &clock);
        match stack.push(Goal::new(fallback, clock.now_ms)) {
            Ok(()) => {
                commitment.record_commitment(self.agent_id, fallback, 0.0, &clock);
                if let Some(evaluator) =
                    evaluators.iter_mut().find(|e| e.category() == fallback)
                {
                    // Treat recovery as a fresh start for the fallback.
                    evaluator.forget_agent(self.agent_id);
                }
            }
            Err(push_err) => {
                // The stack itself is broken; leave the agent goalless
                // rather than looping on installs.
                tracing::error!(
                    agent = %self.agent_id,
                    error = %push_err,
                    "fallback goal install failed during recovery"
                );
            }
        }
        telemetry.emit(
            clock.now_ms,
            DiagnosticEvent::RecoveryPerformed {
                agent_id: self.agent_id,
                fallback,
                tick: clock.tick,
            },
        );
        self.consecutive_failures = 0;
        TickOutcome::Recovered { fallback }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::MaxUtilitySelector;
    use crate::stack::InMemoryGoalStack;
    use crate::telemetry::MemorySink;
    use agent_context::Personality;

    const AGENT: AgentId = AgentId(9);

    fn ctx(tick: u64, now_ms: u64) -> AgentContext {
        AgentContext::new(AGENT, TickClock::new(tick, now_ms))
    }

    fn classify(ctx: &AgentContext) -> SituationClass {
        SituationClass::classify(ctx, None, &ArbitrationConfig::default())
    }

    #[test]
    fn test_classification_ladder() {
        assert_eq!(
            classify(&ctx(0, 0).with_health(10.0, 100.0)),
            SituationClass::Critical
        );
        assert_eq!(
            classify(&ctx(0, 0).with_threats(3)),
            SituationClass::Critical
        );
        assert_eq!(
            classify(&ctx(0, 0).with_visible_target(20.0)),
            SituationClass::Combat
        );
        assert_eq!(
            classify(&ctx(0, 0).with_health(50.0, 100.0)),
            SituationClass::Damaged
        );
        assert_eq!(
            classify(&ctx(0, 5_000).with_damage_at(4_000)),
            SituationClass::Alert
        );
        assert_eq!(classify(&ctx(0, 0)), SituationClass::Safe);
        assert_eq!(
            SituationClass::classify(
                &ctx(0, 0),
                Some(GoalCategory::Explore),
                &ArbitrationConfig::default()
            ),
            SituationClass::Exploring
        );
    }

    #[test]
    fn test_intervals_tighten_with_urgency() {
        let cfg = ArbitrationConfig::default();
        let ordered = [
            SituationClass::Critical,
            SituationClass::Combat,
            SituationClass::Damaged,
            SituationClass::Alert,
            SituationClass::Exploring,
            SituationClass::Safe,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].interval_ms(&cfg) < pair[1].interval_ms(&cfg));
        }
    }

    struct Harness {
        arbitrator: Arbitrator,
        evaluators: EvaluatorSet,
        selector: MaxUtilitySelector,
        stack: InMemoryGoalStack,
        commitment: CommitmentManager,
        telemetry: TelemetryLog<MemorySink>,
    }

    impl Harness {
        fn new() -> Self {
            let config = ArbiterConfig::default();
            Self {
                evaluators: crate::evaluators::default_evaluators(&config.evaluators),
                commitment: CommitmentManager::new(config.commitment.clone()),
                telemetry: TelemetryLog::new(MemorySink::new(), config.telemetry.clone()),
                arbitrator: Arbitrator::new(AGENT, config),
                selector: MaxUtilitySelector::new(),
                stack: InMemoryGoalStack::new(),
            }
        }

        fn tick(&mut self, ctx: &AgentContext) -> TickOutcome {
            self.arbitrator.tick(
                ctx,
                &mut self.evaluators,
                &mut self.selector,
                &mut self.stack,
                &mut self.commitment,
                &mut self.telemetry,
            )
        }
    }

    #[test]
    fn test_same_tick_is_idempotent() {
        let mut h = Harness::new();
        let c = ctx(1, 16);
        assert!(matches!(h.tick(&c), TickOutcome::Arbitrated { .. }));
        assert!(matches!(h.tick(&c), TickOutcome::SameTick));
        assert_eq!(h.stack.current().unwrap().category, GoalCategory::Explore);
    }

    #[test]
    fn test_waits_for_interval_when_calm() {
        let mut h = Harness::new();
        assert!(matches!(h.tick(&ctx(1, 0)), TickOutcome::Arbitrated { .. }));
        // The safe interval is 1200 ms; the next frame is far too soon.
        assert!(matches!(h.tick(&ctx(2, 16)), TickOutcome::Waiting { .. }));
        assert!(matches!(
            h.tick(&ctx(80, 1_300)),
            TickOutcome::Arbitrated { .. }
        ));
    }

    #[test]
    fn test_emergency_override_bypasses_interval() {
        let mut h = Harness::new();
        h.tick(&ctx(1, 0));
        assert_eq!(h.stack.current().unwrap().category, GoalCategory::Explore);

        // 100 ms later, far inside both the interval and explore's
        // commitment window, health collapses.
        let hurt = ctx(7, 100).with_health(10.0, 100.0);
        let outcome = h.tick(&hurt);
        match outcome {
            TickOutcome::Arbitrated { overridden, .. } => {
                assert_eq!(overridden, Some(CriticalOverride::EmergencyHealth));
            }
            other => panic!("expected arbitration, got {other:?}"),
        }
        assert_eq!(
            h.stack.current().unwrap().category,
            GoalCategory::GetHealth
        );
    }

    #[test]
    fn test_target_death_overrides_attack_goal() {
        let mut h = Harness::new();
        h.tick(&ctx(1, 0).with_visible_target(15.0));
        assert_eq!(h.stack.current().unwrap().category, GoalCategory::Attack);

        let mut c = ctx(3, 50).with_visible_target(15.0);
        c.target_died = true;
        c.target = None;
        let outcome = h.tick(&c);
        match outcome {
            TickOutcome::Arbitrated { overridden, .. } => {
                assert_eq!(overridden, Some(CriticalOverride::TargetDied));
            }
            other => panic!("expected arbitration, got {other:?}"),
        }
        // Attack scores zero on a dead target, so the agent moves on.
        assert_ne!(h.stack.current().unwrap().category, GoalCategory::Attack);
    }

    #[test]
    fn test_stuck_override_fires_after_threshold() {
        let mut h = Harness::new();
        let c = ctx(1, 2_000).with_stuck_since(200);
        match h.tick(&c) {
            TickOutcome::Arbitrated { overridden, .. } => {
                assert_eq!(overridden, Some(CriticalOverride::StuckTooLong));
            }
            other => panic!("expected arbitration, got {other:?}"),
        }
    }

    #[test]
    fn test_finished_goal_is_retired_before_selection() {
        let mut h = Harness::new();
        h.tick(&ctx(1, 0));
        h.stack
            .finish_current(agent_context::GoalStatus::Completed);

        // Retirement clears the slot; explore is on its post-goal
        // cooldown and nothing else wants to run, so the agent idles.
        let outcome = h.tick(&ctx(75, 1_200));
        assert!(matches!(outcome, TickOutcome::Arbitrated { .. }));
        assert!(h.stack.current().is_none());
        assert!(h.commitment.committed_category(AGENT).is_none());

        // Once the cooldown elapses, explore is picked back up.
        assert!(matches!(
            h.tick(&ctx(180, 2_900)),
            TickOutcome::Arbitrated { .. }
        ));
        let goal = h.stack.current().unwrap();
        assert_eq!(goal.category, GoalCategory::Explore);
        assert_eq!(goal.status, agent_context::GoalStatus::Active);
        assert_eq!(
            h.commitment.committed_category(AGENT),
            Some(GoalCategory::Explore)
        );
    }

    #[test]
    fn test_reaction_delay_gates_engagement() {
        let mut h = Harness::new();
        // Low accuracy stretches the delay: 300 * (1.5 - 0.1) = 420 ms.
        let personality = Personality {
            accuracy: 0.2,
            ..Personality::balanced()
        };
        let seen = ctx(1, 1_000)
            .with_visible_target(20.0)
            .with_personality(personality);
        h.tick(&seen);
        assert!(!h.arbitrator.engage_ready);

        let later = ctx(30, 1_500)
            .with_visible_target(20.0)
            .with_personality(personality);
        h.tick(&later);
        assert!(h.arbitrator.engage_ready);
    }

    struct FailingSelector;

    impl GoalSelector for FailingSelector {
        fn select(
            &mut self,
            _ctx: &AgentContext,
            _evaluators: &mut EvaluatorSet,
            _hints: &PriorityHints,
            _urgency: SwitchUrgency,
            _stack: &mut dyn GoalStack,
            _commitment: &mut CommitmentManager,
            _config: &crate::config::EvaluatorConfig,
        ) -> Result<SelectionReport, SelectionError> {
            Err(SelectionError::NoEvaluators)
        }
    }

    #[test]
    fn test_three_failures_recover_to_explore() {
        let mut h = Harness::new();
        let mut selector = FailingSelector;

        let mut outcomes = Vec::new();
        for (tick, now) in [(1u64, 0u64), (80, 1_300), (160, 2_600)] {
            outcomes.push(h.arbitrator.tick(
                &ctx(tick, now),
                &mut h.evaluators,
                &mut selector,
                &mut h.stack,
                &mut h.commitment,
                &mut h.telemetry,
            ));
        }
        assert!(matches!(
            outcomes[0],
            TickOutcome::Faulted {
                consecutive_failures: 1
            }
        ));
        assert!(matches!(
            outcomes[1],
            TickOutcome::Faulted {
                consecutive_failures: 2
            }
        ));
        assert!(matches!(
            outcomes[2],
            TickOutcome::Recovered {
                fallback: GoalCategory::Explore
            }
        ));
        assert_eq!(h.stack.current().unwrap().category, GoalCategory::Explore);
        assert_eq!(
            h.commitment.committed_category(AGENT),
            Some(GoalCategory::Explore)
        );
        assert_eq!(h.telemetry.sink().count_key("recovery_performed"), 1);
        assert_eq!(h.arbitrator.consecutive_failures, 0);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let mut h = Harness::new();
        let mut failing = FailingSelector;
        h.arbitrator.tick(
            &ctx(1, 0),
            &mut h.evaluators,
            &mut failing,
            &mut h.stack,
            &mut h.commitment,
            &mut h.telemetry,
        );
        assert_eq!(h.arbitrator.consecutive_failures, 1);

        assert!(matches!(
            h.tick(&ctx(80, 1_300)),
            TickOutcome::Arbitrated { .. }
        ));
        assert_eq!(h.arbitrator.consecutive_failures, 0);
    }

    #[test]
    fn test_situation_cache_honors_ttl() {
        let mut h = Harness::new();
        let calm = ctx(1, 0);
        h.arbitrator.situation(&calm, None);
        // Inside the TTL the cached class is reused even though the
        // context now looks critical.
        let hurt = ctx(2, 100).with_health(5.0, 100.0);
        assert_eq!(h.arbitrator.situation(&hurt, None), SituationClass::Safe);
        // Past the TTL it is recomputed.
        let hurt_later = ctx(20, 400).with_health(5.0, 100.0);
        assert_eq!(
            h.arbitrator.situation(&hurt_later, None),
            SituationClass::Critical
        );
    }

    #[test]
    fn test_teardown_clears_collaborator_state() {
        let mut h = Harness::new();
        h.tick(&ctx(1, 0));
        assert!(h.commitment.committed_category(AGENT).is_some());
        let mut arbitrator = h.arbitrator;
        arbitrator.teardown(&mut h.evaluators, &mut h.commitment, &mut h.telemetry);
        assert!(h.commitment.committed_category(AGENT).is_none());
        assert!(arbitrator.last_tick.is_none());
    }
}
