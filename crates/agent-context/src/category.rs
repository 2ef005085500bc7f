//! Goal category and status tags.
//!
//! Categories are explicit tags carried by goals and evaluators and
//! compared by equality, never by name inspection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavior category an agent can pursue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Attack,
    GetHealth,
    GetAmmo,
    GetWeapon,
    TakeCover,
    Flank,
    Hunt,
    Explore,
    Retreat,
}

impl GoalCategory {
    /// Returns all category variants.
    pub fn all() -> &'static [GoalCategory] {
        &[
            GoalCategory::Attack,
            GoalCategory::GetHealth,
            GoalCategory::GetAmmo,
            GoalCategory::GetWeapon,
            GoalCategory::TakeCover,
            GoalCategory::Flank,
            GoalCategory::Hunt,
            GoalCategory::Explore,
            GoalCategory::Retreat,
        ]
    }

    /// Categories that cannot run without a live target.
    pub fn requires_target(self) -> bool {
        matches!(
            self,
            GoalCategory::Attack | GoalCategory::Flank | GoalCategory::Hunt
        )
    }

    /// Categories that cannot run with an empty weapon.
    pub fn requires_ammo(self) -> bool {
        matches!(self, GoalCategory::Attack | GoalCategory::Flank)
    }

    /// Categories that exist to keep the agent alive.
    pub fn is_survival(self) -> bool {
        matches!(
            self,
            GoalCategory::GetHealth | GoalCategory::TakeCover | GoalCategory::Retreat
        )
    }

    /// The safe fallback category used by failure recovery.
    pub fn fallback() -> Self {
        GoalCategory::Explore
    }
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GoalCategory::Attack => "attack",
            GoalCategory::GetHealth => "get_health",
            GoalCategory::GetAmmo => "get_ammo",
            GoalCategory::GetWeapon => "get_weapon",
            GoalCategory::TakeCover => "take_cover",
            GoalCategory::Flank => "flank",
            GoalCategory::Hunt => "hunt",
            GoalCategory::Explore => "explore",
            GoalCategory::Retreat => "retreat",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle status of a goal instance.
///
/// Exactly one goal may be `Active` per agent at a time; installing a new
/// goal clears the prior one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Inactive,
    Active,
    Completed,
    Failed,
}

impl GoalStatus {
    /// Returns true once the goal has run to an end, successfully or not.
    pub fn is_finished(self) -> bool {
        matches!(self, GoalStatus::Completed | GoalStatus::Failed)
    }
}

/// Discrete display/animation state projected from the active goal for
/// the external state-machine collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    Combat,
    SeekResource,
    Flee,
    Patrol,
    Idle,
}

impl DisplayState {
    /// Canonical state name, used when comparing against the external
    /// state machine's current state string.
    pub fn name(self) -> &'static str {
        match self {
            DisplayState::Combat => "combat",
            DisplayState::SeekResource => "seek_resource",
            DisplayState::Flee => "flee",
            DisplayState::Patrol => "patrol",
            DisplayState::Idle => "idle",
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_covers_every_variant() {
        assert_eq!(GoalCategory::all().len(), 9);
    }

    #[test]
    fn test_target_requirements() {
        assert!(GoalCategory::Attack.requires_target());
        assert!(GoalCategory::Hunt.requires_target());
        assert!(!GoalCategory::Explore.requires_target());
        assert!(!GoalCategory::GetHealth.requires_target());
    }

    #[test]
    fn test_ammo_requirements() {
        assert!(GoalCategory::Attack.requires_ammo());
        assert!(!GoalCategory::Hunt.requires_ammo());
        assert!(!GoalCategory::TakeCover.requires_ammo());
    }

    #[test]
    fn test_fallback_is_explore() {
        assert_eq!(GoalCategory::fallback(), GoalCategory::Explore);
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&GoalCategory::GetHealth).unwrap(),
            r#""get_health""#
        );
        assert_eq!(
            serde_json::to_string(&GoalCategory::TakeCover).unwrap(),
            r#""take_cover""#
        );
    }

    #[test]
    fn test_status_finished() {
        assert!(GoalStatus::Completed.is_finished());
        assert!(GoalStatus::Failed.is_finished());
        assert!(!GoalStatus::Active.is_finished());
        assert!(!GoalStatus::Inactive.is_finished());
    }

    #[test]
    fn test_display_state_names() {
        assert_eq!(DisplayState::SeekResource.name(), "seek_resource");
        assert_eq!(DisplayState::Combat.to_string(), "combat");
    }
}
