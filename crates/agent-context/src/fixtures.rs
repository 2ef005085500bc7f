//! Sample contexts for testing.
//!
//! Ready-made agent snapshots for other crates' tests. Enable the
//! `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // agent-context = { path = "../agent-context", features = ["test-fixtures"] }
//!
//! use agent_context::fixtures;
//!
//! let ctx = fixtures::firefight(agent_context::AgentId(1), 10, 5_000);
//! ```

use crate::{AgentContext, AgentId, Personality, TickClock, WorldResources};

/// A healthy agent with nothing going on: no target, no damage, full
/// resources. The quietest snapshot the arbiter will ever see.
pub fn calm_patrol(agent_id: AgentId, tick: u64, now_ms: u64) -> AgentContext {
    AgentContext::new(agent_id, TickClock::new(tick, now_ms))
}

/// A healthy, fully armed agent with a visible target at mid range.
pub fn firefight(agent_id: AgentId, tick: u64, now_ms: u64) -> AgentContext {
    AgentContext::new(agent_id, TickClock::new(tick, now_ms)).with_visible_target(15.0)
}

/// A critically wounded agent still facing a visible target.
pub fn near_death(agent_id: AgentId, tick: u64, now_ms: u64) -> AgentContext {
    AgentContext::new(agent_id, TickClock::new(tick, now_ms))
        .with_health(12.0, 100.0)
        .with_visible_target(10.0)
        .with_damage_at(now_ms.saturating_sub(200))
}

/// A half-health agent in a world with no pickups of any kind.
pub fn scavenger_drought(agent_id: AgentId, tick: u64, now_ms: u64) -> AgentContext {
    AgentContext::new(agent_id, TickClock::new(tick, now_ms))
        .with_health(50.0, 100.0)
        .with_world(WorldResources {
            health_pickups: false,
            ammo_pickups: false,
            weapon_pickups: false,
            cover_points: true,
        })
}

/// An aggressive personality useful for asymmetric-scoring tests.
pub fn berserker() -> Personality {
    Personality {
        aggression: 0.95,
        caution: 0.1,
        accuracy: 0.6,
        adaptability: 0.4,
    }
}

/// A timid personality useful for asymmetric-scoring tests.
pub fn coward() -> Personality {
    Personality {
        aggression: 0.1,
        caution: 0.95,
        accuracy: 0.5,
        adaptability: 0.6,
    }
}
