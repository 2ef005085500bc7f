//! Read-only agent context snapshot.
//!
//! A host builds one `AgentContext` per agent per simulation tick from
//! its own perception, physics, and combat state. The arbitration core
//! only ever reads it; all writes flow back through the goal stack
//! collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::TickClock;
use crate::numeric::{clamp01, ratio, sanitize};

/// Opaque agent identity assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{}", self.0)
    }
}

/// Personality trait bundle; each trait is nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub aggression: f64,
    pub caution: f64,
    pub accuracy: f64,
    pub adaptability: f64,
}

impl Personality {
    /// A balanced personality with every trait at 0.5.
    pub fn balanced() -> Self {
        Self {
            aggression: 0.5,
            caution: 0.5,
            accuracy: 0.5,
            adaptability: 0.5,
        }
    }

    /// Aggression clamped to `[0, 1]`.
    pub fn aggression(&self) -> f64 {
        clamp01(self.aggression)
    }

    /// Caution clamped to `[0, 1]`.
    pub fn caution(&self) -> f64 {
        clamp01(self.caution)
    }

    /// Accuracy clamped to `[0, 1]`.
    pub fn accuracy(&self) -> f64 {
        clamp01(self.accuracy)
    }

    /// Adaptability clamped to `[0, 1]`.
    pub fn adaptability(&self) -> f64 {
        clamp01(self.adaptability)
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::balanced()
    }
}

/// What the agent currently knows about its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    /// Target passed the most recent visibility check.
    pub visible: bool,
    /// Distance to the target in world units.
    pub distance: f64,
    /// Simulation time the target was last seen.
    pub last_seen_ms: u64,
}

/// Which resource pickups exist anywhere in the world right now.
///
/// A category whose backing resource is absent is heavily discounted but
/// not zeroed, so it stays available as a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldResources {
    pub health_pickups: bool,
    pub ammo_pickups: bool,
    pub weapon_pickups: bool,
    pub cover_points: bool,
}

impl Default for WorldResources {
    fn default() -> Self {
        Self {
            health_pickups: true,
            ammo_pickups: true,
            weapon_pickups: true,
            cover_points: true,
        }
    }
}

/// Per-tick read-only view of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    pub agent_id: AgentId,
    pub clock: TickClock,
    pub health: f64,
    pub max_health: f64,
    pub ammo: f64,
    pub max_ammo: f64,
    pub has_weapon: bool,
    pub weapon_ready: bool,
    /// Current target knowledge, if the agent has one at all.
    pub target: Option<TargetInfo>,
    /// The current target died since the last tick.
    pub target_died: bool,
    pub stuck: bool,
    /// Simulation time the stuck condition began, if stuck.
    pub stuck_since_ms: Option<u64>,
    /// Simulation time of the most recent damage taken.
    pub last_damage_ms: Option<u64>,
    /// Number of distinct threats currently sensed.
    pub threat_count: u32,
    pub personality: Personality,
    pub world: WorldResources,
}

impl AgentContext {
    /// Creates a healthy, armed, idle context; tests and hosts layer
    /// specifics on top with the `with_` methods.
    pub fn new(agent_id: AgentId, clock: TickClock) -> Self {
        Self {
            agent_id,
            clock,
            health: 100.0,
            max_health: 100.0,
            ammo: 30.0,
            max_ammo: 30.0,
            has_weapon: true,
            weapon_ready: true,
            target: None,
            target_died: false,
            stuck: false,
            stuck_since_ms: None,
            last_damage_ms: None,
            threat_count: 0,
            personality: Personality::balanced(),
            world: WorldResources::default(),
        }
    }

    /// Sets health and max health.
    pub fn with_health(mut self, health: f64, max_health: f64) -> Self {
        self.health = health;
        self.max_health = max_health;
        self
    }

    /// Sets ammo and max ammo.
    pub fn with_ammo(mut self, ammo: f64, max_ammo: f64) -> Self {
        self.ammo = ammo;
        self.max_ammo = max_ammo;
        self
    }

    /// Sets a visible target at the given distance.
    pub fn with_visible_target(mut self, distance: f64) -> Self {
        self.target = Some(TargetInfo {
            visible: true,
            distance,
            last_seen_ms: self.clock.now_ms,
        });
        self
    }

    /// Sets a known but currently unseen target.
    pub fn with_lost_target(mut self, distance: f64, last_seen_ms: u64) -> Self {
        self.target = Some(TargetInfo {
            visible: false,
            distance,
            last_seen_ms,
        });
        self
    }

    /// Marks the agent stuck since the given time.
    pub fn with_stuck_since(mut self, since_ms: u64) -> Self {
        self.stuck = true;
        self.stuck_since_ms = Some(since_ms);
        self
    }

    /// Sets the personality bundle.
    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    /// Sets world resource availability.
    pub fn with_world(mut self, world: WorldResources) -> Self {
        self.world = world;
        self
    }

    /// Sets the sensed threat count.
    pub fn with_threats(mut self, count: u32) -> Self {
        self.threat_count = count;
        self
    }

    /// Sets the last-damage timestamp.
    pub fn with_damage_at(mut self, at_ms: u64) -> Self {
        self.last_damage_ms = Some(at_ms);
        self
    }

    /// Health as a sanitized ratio in `[0, 1]`.
    pub fn health_ratio(&self) -> f64 {
        ratio(self.health, self.max_health)
    }

    /// Ammo as a sanitized ratio in `[0, 1]`.
    pub fn ammo_ratio(&self) -> f64 {
        ratio(self.ammo, self.max_ammo)
    }

    /// True when the target passed the most recent visibility check.
    pub fn target_visible(&self) -> bool {
        self.target.map(|t| t.visible).unwrap_or(false)
    }

    /// Sanitized distance to the target, if one is known.
    pub fn target_distance(&self) -> Option<f64> {
        self.target.map(|t| sanitize(t.distance, f64::MAX).max(0.0))
    }

    /// Milliseconds since the target was last seen, if one is known.
    pub fn ms_since_target_seen(&self) -> Option<u64> {
        self.target.map(|t| self.clock.elapsed_since(t.last_seen_ms))
    }

    /// Milliseconds since the agent last took damage, if it ever has.
    pub fn ms_since_damage(&self) -> Option<u64> {
        self.last_damage_ms.map(|t| self.clock.elapsed_since(t))
    }

    /// How long the agent has been stuck, in milliseconds.
    pub fn stuck_duration_ms(&self) -> u64 {
        if !self.stuck {
            return 0;
        }
        self.stuck_since_ms
            .map(|t| self.clock.elapsed_since(t))
            .unwrap_or(0)
    }

    /// True when the agent has a weapon with at least one usable shot.
    pub fn can_shoot(&self) -> bool {
        self.has_weapon && self.weapon_ready && self.ammo_ratio() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AgentContext {
        AgentContext::new(AgentId(1), TickClock::new(10, 5_000))
    }

    #[test]
    fn test_agent_id_display() {
        assert_eq!(AgentId(42).to_string(), "agent_42");
    }

    #[test]
    fn test_health_ratio_sanitized() {
        let c = ctx().with_health(f64::NAN, 100.0);
        assert_eq!(c.health_ratio(), 0.0);

        let c = ctx().with_health(50.0, 0.0);
        assert_eq!(c.health_ratio(), 0.0);

        let c = ctx().with_health(120.0, 100.0);
        assert_eq!(c.health_ratio(), 1.0);
    }

    #[test]
    fn test_target_accessors() {
        let c = ctx();
        assert!(!c.target_visible());
        assert_eq!(c.target_distance(), None);

        let c = ctx().with_visible_target(12.0);
        assert!(c.target_visible());
        assert_eq!(c.target_distance(), Some(12.0));
        assert_eq!(c.ms_since_target_seen(), Some(0));
    }

    #[test]
    fn test_lost_target_elapsed() {
        let c = ctx().with_lost_target(20.0, 3_000);
        assert!(!c.target_visible());
        assert_eq!(c.ms_since_target_seen(), Some(2_000));
    }

    #[test]
    fn test_stuck_duration() {
        assert_eq!(ctx().stuck_duration_ms(), 0);
        let c = ctx().with_stuck_since(3_500);
        assert_eq!(c.stuck_duration_ms(), 1_500);
    }

    #[test]
    fn test_can_shoot() {
        assert!(ctx().can_shoot());
        let c = ctx().with_ammo(0.0, 30.0);
        assert!(!c.can_shoot());
        let mut c = ctx();
        c.has_weapon = false;
        assert!(!c.can_shoot());
    }

    #[test]
    fn test_personality_clamped() {
        let p = Personality {
            aggression: 1.7,
            caution: -0.2,
            accuracy: f64::NAN,
            adaptability: 0.4,
        };
        assert_eq!(p.aggression(), 1.0);
        assert_eq!(p.caution(), 0.0);
        assert_eq!(p.accuracy(), 0.0);
        assert_eq!(p.adaptability(), 0.4);
    }
}
