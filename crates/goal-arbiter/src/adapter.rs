//! Display-state adapter.
//!
//! Bridges goal categories to a host-owned display state machine
//! (animation controller, debug HUD, AI status panel). The adapter
//! polls on its own coarse interval, maps the active category onto a
//! small display vocabulary, and only pushes a state when it actually
//! changed. When no goal is active it infers a state directly from the
//! context so the display never freezes on a stale goal.

use agent_context::{AgentContext, DisplayState, GoalCategory};

use crate::config::AdapterConfig;

/// Host-side display state machine.
///
/// Implementations report their current state by name; names are
/// normalized before comparison, so hosts with conventions like
/// `CombatState` or `combat_state` work unmodified.
pub trait DisplayStateMachine {
    /// The machine's current state name, if it has one.
    fn current_state(&self) -> Option<&str>;

    /// Transitions the machine to the given state.
    fn apply(&mut self, state: DisplayState);
}

/// Minimal in-memory state machine, mostly for tests and tools.
#[derive(Debug, Default)]
pub struct LatchingStateMachine {
    state: Option<DisplayState>,
    transitions: u32,
}

impl LatchingStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<DisplayState> {
        self.state
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}

impl DisplayStateMachine for LatchingStateMachine {
    fn current_state(&self) -> Option<&str> {
        self.state.map(DisplayState::name)
    }

    fn apply(&mut self, state: DisplayState) {
        self.state = Some(state);
        self.transitions += 1;
    }
}

/// Normalizes a state name for comparison: trims, lowercases, strips a
/// trailing `state` word, and drops `_`/`-` separators. CamelCase,
/// snake_case, and kebab-case hosts all collapse to the same key.
pub fn normalize_state_name(raw: &str) -> String {
    let mut name = raw.trim().to_ascii_lowercase();
    if let Some(stripped) = name.strip_suffix("state") {
        let keep = stripped.len();
        name.truncate(keep);
    }
    name.retain(|c| c != '_' && c != '-');
    name
}

/// Maps goal categories to display states, decoupled from goal ticks.
#[derive(Debug)]
pub struct GoalStateAdapter {
    config: AdapterConfig,
    next_poll_ms: u64,
}

impl GoalStateAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            next_poll_ms: 0,
        }
    }

    /// Polls once. Returns the state pushed to the machine, or `None`
    /// when the poll is not due yet or the machine is already there.
    pub fn poll(
        &mut self,
        ctx: &AgentContext,
        active_goal: Option<GoalCategory>,
        machine: &mut dyn DisplayStateMachine,
    ) -> Option<DisplayState> {
        let now = ctx.clock.now_ms;
        if now < self.next_poll_ms {
            return None;
        }
        self.next_poll_ms = now + self.config.poll_interval_ms;

        let desired = self.desired_state(ctx, active_goal);
        let already_there = machine
            .current_state()
            .map(|name| normalize_state_name(name) == normalize_state_name(desired.name()))
            .unwrap_or(false);
        if already_there {
            return None;
        }
        machine.apply(desired);
        Some(desired)
    }

    /// The display state the agent should be showing right now.
    pub fn desired_state(
        &self,
        ctx: &AgentContext,
        active_goal: Option<GoalCategory>,
    ) -> DisplayState {
        match active_goal {
            Some(category) => Self::state_for_category(category),
            None => self.infer_from_context(ctx),
        }
    }

    fn state_for_category(category: GoalCategory) -> DisplayState {
        match category {
            GoalCategory::Attack | GoalCategory::Flank | GoalCategory::Hunt => DisplayState::Combat,
            GoalCategory::GetHealth | GoalCategory::GetAmmo | GoalCategory::GetWeapon => {
                DisplayState::SeekResource
            }
            GoalCategory::TakeCover | GoalCategory::Retreat => DisplayState::Flee,
            GoalCategory::Explore => DisplayState::Patrol,
        }
    }

    // Goalless fallback, e.g. between a finished goal and the next
    // arbitration pass.
    fn infer_from_context(&self, ctx: &AgentContext) -> DisplayState {
        if ctx.target_visible() {
            DisplayState::Combat
        } else if ctx.health_ratio() < self.config.low_health_ratio {
            DisplayState::Flee
        } else if ctx.target.is_some() || ctx.threat_count > 0 {
            DisplayState::Patrol
        } else {
            DisplayState::Idle
        }
    }
}
