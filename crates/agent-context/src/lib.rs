//! Shared agent vocabulary for the goal arbitration core.
//!
//! This crate contains pure data structures with no decision logic:
//! the read-only agent context snapshot, goal category tags, the tick
//! clock, numeric sanitation helpers, and the diagnostic event types.
//! It is a dependency for the `goal-arbiter` crate and for any host that
//! feeds it.

pub mod category;
pub mod clock;
pub mod context;
pub mod numeric;
pub mod telemetry;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export category types
pub use category::{DisplayState, GoalCategory, GoalStatus};

// Re-export clock types
pub use clock::TickClock;

// Re-export context types
pub use context::{AgentContext, AgentId, Personality, TargetInfo, WorldResources};

// Re-export numeric helpers
pub use numeric::{clamp01, ratio, sanitize};

// Re-export telemetry types
pub use telemetry::DiagnosticEvent;
