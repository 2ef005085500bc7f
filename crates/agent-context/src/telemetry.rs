//! Diagnostic event vocabulary.
//!
//! Typed events emitted by the arbitration core for observability:
//! goal commitments, thrash warnings, and failure recovery. Hosts decide
//! where they go; the types here are plain serializable data.

use serde::{Deserialize, Serialize};

use crate::category::GoalCategory;
use crate::context::AgentId;

/// A diagnostic event produced by the arbitration core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// An agent committed to a new goal category.
    GoalCommitted {
        agent_id: AgentId,
        category: GoalCategory,
        score: f64,
        tick: u64,
    },
    /// An agent switched goal categories rapidly enough to look unstable.
    ThrashWarning {
        agent_id: AgentId,
        switch_count: usize,
        window_ms: u64,
        tick: u64,
    },
    /// An arbitration pass failed; the failure was contained.
    ArbitrationFault {
        agent_id: AgentId,
        detail: String,
        consecutive_failures: u32,
        tick: u64,
    },
    /// Repeated failures triggered recovery to the fallback category.
    RecoveryPerformed {
        agent_id: AgentId,
        fallback: GoalCategory,
        tick: u64,
    },
}

impl DiagnosticEvent {
    /// The agent this event concerns.
    pub fn agent_id(&self) -> AgentId {
        match self {
            DiagnosticEvent::GoalCommitted { agent_id, .. }
            | DiagnosticEvent::ThrashWarning { agent_id, .. }
            | DiagnosticEvent::ArbitrationFault { agent_id, .. }
            | DiagnosticEvent::RecoveryPerformed { agent_id, .. } => *agent_id,
        }
    }

    /// Stable message key used for per-(agent, key) rate limiting.
    pub fn key(&self) -> &'static str {
        match self {
            DiagnosticEvent::GoalCommitted { .. } => "goal_committed",
            DiagnosticEvent::ThrashWarning { .. } => "thrash_warning",
            DiagnosticEvent::ArbitrationFault { .. } => "arbitration_fault",
            DiagnosticEvent::RecoveryPerformed { .. } => "recovery_performed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_agent_and_key() {
        let event = DiagnosticEvent::ThrashWarning {
            agent_id: AgentId(7),
            switch_count: 11,
            window_ms: 2_000,
            tick: 40,
        };
        assert_eq!(event.agent_id(), AgentId(7));
        assert_eq!(event.key(), "thrash_warning");
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = DiagnosticEvent::RecoveryPerformed {
            agent_id: AgentId(3),
            fallback: GoalCategory::Explore,
            tick: 9,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"recovery_performed""#));
        assert!(json.contains(r#""fallback":"explore""#));
    }

    #[test]
    fn test_event_roundtrip() {
        let event = DiagnosticEvent::GoalCommitted {
            agent_id: AgentId(1),
            category: GoalCategory::Attack,
            score: 0.85,
            tick: 12,
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: DiagnosticEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
