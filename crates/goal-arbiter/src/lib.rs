//! Goal arbitration: utility-scored goal selection for game agents.
//!
//! The arbiter sits between an agent's senses and its behaviors. Each
//! simulation tick the host hands it a snapshot of what the agent
//! knows, and the arbiter decides which goal category the agent should
//! be pursuing right now, with enough hysteresis that the decision
//! doesn't flap.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   AgentContext    ┌────────────┐   Goal (category)
//! │  host senses │ ────────────────▶ │ arbitrator │ ──────────────────▶ behaviors
//! └──────────────┘                   └────────────┘
//!                                          │ category
//!                                          ▼
//!                                    ┌────────────┐   DisplayState
//!                                    │  adapter   │ ──────────────────▶ host FSM
//!                                    └────────────┘
//! ```
//!
//! # Modules
//!
//! - [`arbitrator`]: Per-agent tick gate, situation classes, critical
//!   overrides, failure recovery
//! - [`evaluators`]: One desirability evaluator per goal category
//! - [`commitment`]: Process-wide hysteresis and commitment windows
//! - [`selection`]: Max-utility winner selection and installation
//! - [`adapter`]: Category-to-display-state bridge
//! - [`config`]: All tuning constants, TOML-loadable

pub mod adapter;
pub mod arbitrator;
pub mod commitment;
pub mod config;
pub mod deferred;
pub mod error;
pub mod evaluator;
pub mod evaluators;
pub mod hints;
pub mod selection;
pub mod stack;
pub mod telemetry;

// Re-export arbitrator types
pub use arbitrator::{Arbitrator, CriticalOverride, SituationClass, TickOutcome};

// Re-export commitment types
pub use commitment::{CommitmentManager, SwitchDecision, SwitchReason, SwitchUrgency};

// Re-export evaluator plumbing
pub use evaluator::{
    EvaluatorCore, EvaluatorMemory, EvaluatorSet, GoalEvaluator, InstallEnv, InstallOutcome,
    ScoringEnv,
};
pub use evaluators::default_evaluators;

// Re-export selection types
pub use selection::{GoalSelector, MaxUtilitySelector, SelectionReport};

// Re-export goal stack types
pub use stack::{Goal, GoalStack, InMemoryGoalStack};

// Re-export adapter types
pub use adapter::{
    normalize_state_name, DisplayStateMachine, GoalStateAdapter, LatchingStateMachine,
};

// Re-export config types
pub use config::{
    AdapterConfig, ArbiterConfig, ArbitrationConfig, BiasWeights, CommitmentConfig,
    CommitmentDurations, ConfigError, EvaluatorConfig, TelemetryConfig,
};

// Re-export error and support types
pub use error::{InstallError, SelectionError};
pub use hints::PriorityHints;
pub use telemetry::{JsonLinesSink, MemorySink, TelemetryLog, TelemetrySink, TracingSink};
