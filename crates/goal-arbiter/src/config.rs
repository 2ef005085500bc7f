//! Configuration for the arbitration core.
//!
//! All tuning constants live here as structured named fields, loadable
//! from a TOML file. The defaults are empirically tuned values with no
//! derivation behind them; treat them as starting points, not laws.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use agent_context::GoalCategory;

/// Complete arbitration configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Tick orchestration settings
    pub arbitration: ArbitrationConfig,
    /// Commitment and hysteresis settings
    pub commitment: CommitmentConfig,
    /// Evaluator scoring settings
    pub evaluators: EvaluatorConfig,
    /// Display-state adapter settings
    pub adapter: AdapterConfig,
    /// Diagnostic rate limiting
    pub telemetry: TelemetryConfig,
}

impl ArbiterConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Errors from loading or rendering configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings for the per-agent arbitration tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrationConfig {
    /// Re-arbitration interval while the situation is critical (ms)
    pub critical_interval_ms: u64,
    /// Interval while in active combat (ms)
    pub combat_interval_ms: u64,
    /// Interval while damaged but not engaged (ms)
    pub damaged_interval_ms: u64,
    /// Interval while alert (lost target, recent damage, stuck) (ms)
    pub alert_interval_ms: u64,
    /// Interval while exploring (ms)
    pub exploring_interval_ms: u64,
    /// Interval while fully safe (ms)
    pub safe_interval_ms: u64,
    /// How long a computed situation class stays cached (ms)
    pub situation_ttl_ms: u64,
    /// Health ratio at or below which the situation is an emergency
    pub emergency_health_ratio: f64,
    /// Health ratio below which the agent counts as damaged
    pub damaged_health_ratio: f64,
    /// Damage within this window keeps the agent alert (ms)
    pub recent_damage_ms: u64,
    /// Being stuck longer than this triggers a critical override (ms)
    pub stuck_override_ms: u64,
    /// Sensing at least this many threats triggers a critical override
    pub multiple_threat_count: u32,
    /// Delay between first sighting a target and full engagement (ms)
    pub reaction_delay_ms: u64,
    /// Attack hint cap applied before the reaction delay elapses
    pub pre_engage_attack_hint_cap: f64,
    /// Consecutive arbitration failures before recovery kicks in
    pub failure_recovery_threshold: u32,
    /// Transition ring buffer capacity
    pub transition_history: usize,
    /// Sliding window for transition thrash detection (ms)
    pub thrash_window_ms: u64,
    /// Transition count within the window that counts as thrashing
    pub thrash_threshold: usize,
    /// Minimum gap between thrash diagnostics for one agent (ms)
    pub thrash_diag_cooldown_ms: u64,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            critical_interval_ms: 100,
            combat_interval_ms: 200,
            damaged_interval_ms: 350,
            alert_interval_ms: 500,
            exploring_interval_ms: 800,
            safe_interval_ms: 1_200,
            situation_ttl_ms: 250,
            emergency_health_ratio: 0.15,
            damaged_health_ratio: 0.6,
            recent_damage_ms: 3_000,
            stuck_override_ms: 1_500,
            multiple_threat_count: 3,
            reaction_delay_ms: 300,
            pre_engage_attack_hint_cap: 0.6,
            failure_recovery_threshold: 3,
            transition_history: 20,
            thrash_window_ms: 2_000,
            thrash_threshold: 10,
            thrash_diag_cooldown_ms: 5_000,
        }
    }
}

/// Minimum commitment duration per category (ms).
///
/// A goal of a given category cannot be preempted through the normal
/// hysteresis path before its window has elapsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitmentDurations {
    pub attack_ms: u64,
    pub get_health_ms: u64,
    pub get_ammo_ms: u64,
    pub get_weapon_ms: u64,
    pub take_cover_ms: u64,
    pub flank_ms: u64,
    pub hunt_ms: u64,
    pub explore_ms: u64,
    pub retreat_ms: u64,
}

impl CommitmentDurations {
    /// The minimum commitment window for a category.
    pub fn for_category(&self, category: GoalCategory) -> u64 {
        match category {
            GoalCategory::Attack => self.attack_ms,
            GoalCategory::GetHealth => self.get_health_ms,
            GoalCategory::GetAmmo => self.get_ammo_ms,
            GoalCategory::GetWeapon => self.get_weapon_ms,
            GoalCategory::TakeCover => self.take_cover_ms,
            GoalCategory::Flank => self.flank_ms,
            GoalCategory::Hunt => self.hunt_ms,
            GoalCategory::Explore => self.explore_ms,
            GoalCategory::Retreat => self.retreat_ms,
        }
    }
}

impl Default for CommitmentDurations {
    fn default() -> Self {
        Self {
            attack_ms: 1_500,
            get_health_ms: 2_000,
            get_ammo_ms: 1_800,
            get_weapon_ms: 1_800,
            take_cover_ms: 2_000,
            flank_ms: 2_200,
            hunt_ms: 2_000,
            explore_ms: 2_500,
            retreat_ms: 1_200,
        }
    }
}

/// Settings for commitment windows, hysteresis, and thrash bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitmentConfig {
    /// Per-category minimum commitment windows
    pub durations: CommitmentDurations,
    /// Challenger must beat adjusted incumbent score by this factor
    pub hysteresis_normal: f64,
    /// Easier-to-switch factor used in critical situations
    pub hysteresis_critical: f64,
    /// Fraction of the base score granted as bonus at commitment start
    pub bonus_strength: f64,
    /// Weight of goal progress in the completion bonus
    pub completion_weight: f64,
    /// Progress older than this starts to decay (ms)
    pub progress_stale_after_ms: u64,
    /// Per-second multiplicative decay applied to stale progress
    pub progress_decay_per_sec: f64,
    /// Per-second score decay applied after the commitment window ends
    pub score_decay_per_sec: f64,
    /// Switch-history ring buffer capacity
    pub switch_history: usize,
    /// Sliding window for thrash detection (ms)
    pub thrash_window_ms: u64,
    /// Switch count within the window that counts as thrashing
    pub thrash_threshold: usize,
    /// Minimum gap between thrash warnings for one agent (ms)
    pub thrash_warning_cooldown_ms: u64,
    /// Minimum gap between cleanup sweeps (ms)
    pub sweep_interval_ms: u64,
    /// Agent entries untouched this long are evicted by the sweep (ms)
    pub idle_eviction_ms: u64,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            durations: CommitmentDurations::default(),
            hysteresis_normal: 1.35,
            hysteresis_critical: 1.20,
            bonus_strength: 0.3,
            completion_weight: 0.25,
            progress_stale_after_ms: 2_000,
            progress_decay_per_sec: 0.05,
            score_decay_per_sec: 0.02,
            switch_history: 20,
            thrash_window_ms: 2_000,
            thrash_threshold: 10,
            thrash_warning_cooldown_ms: 5_000,
            sweep_interval_ms: 30_000,
            idle_eviction_ms: 300_000,
        }
    }
}

/// Shared evaluator scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Hard ceiling on any desirability score
    pub score_cap: f64,
    /// Flat bonus for the category that is currently active
    pub affinity_bonus: f64,
    /// Multiplier applied when the needed world resource exists nowhere
    pub resource_fallback_discount: f64,
    /// A category scores 0 for this long after its goal ends (ms)
    pub cooldown_after_goal_ms: u64,
    /// Consecutive failed visibility checks tolerated before a target
    /// counts as lost
    pub visibility_grace_frames: u32,
    /// A target unseen longer than this is gone for hunt purposes (ms)
    pub target_lost_timeout_ms: u64,
    /// Exposure categories score 0 below this health ratio
    pub exposure_health_floor: f64,
    /// Health ratio at or below which survival scoring escalates
    pub emergency_health_ratio: f64,
    /// Per-category construction-time bias weights
    pub bias: BiasWeights,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            score_cap: 2.0,
            affinity_bonus: 0.05,
            resource_fallback_discount: 0.15,
            cooldown_after_goal_ms: 1_500,
            visibility_grace_frames: 3,
            target_lost_timeout_ms: 4_000,
            exposure_health_floor: 0.25,
            emergency_health_ratio: 0.15,
            bias: BiasWeights::default(),
        }
    }
}

/// Construction-time bias weight per evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasWeights {
    pub attack: f64,
    pub get_health: f64,
    pub get_ammo: f64,
    pub get_weapon: f64,
    pub take_cover: f64,
    pub flank: f64,
    pub hunt: f64,
    pub explore: f64,
    pub retreat: f64,
}

impl BiasWeights {
    /// The bias weight for a category.
    pub fn for_category(&self, category: GoalCategory) -> f64 {
        match category {
            GoalCategory::Attack => self.attack,
            GoalCategory::GetHealth => self.get_health,
            GoalCategory::GetAmmo => self.get_ammo,
            GoalCategory::GetWeapon => self.get_weapon,
            GoalCategory::TakeCover => self.take_cover,
            GoalCategory::Flank => self.flank,
            GoalCategory::Hunt => self.hunt,
            GoalCategory::Explore => self.explore,
            GoalCategory::Retreat => self.retreat,
        }
    }
}

impl Default for BiasWeights {
    fn default() -> Self {
        Self {
            attack: 1.0,
            get_health: 1.0,
            get_ammo: 1.0,
            get_weapon: 1.0,
            take_cover: 1.0,
            flank: 0.9,
            hunt: 0.95,
            explore: 1.0,
            retreat: 1.0,
        }
    }
}

/// Settings for the display-state adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Poll interval for projecting goal category to display state (ms)
    pub poll_interval_ms: u64,
    /// Health ratio below which the inference fallback seeks resources
    pub low_health_ratio: f64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            low_health_ratio: 0.4,
        }
    }
}

/// Diagnostic rate-limiting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Minimum gap between identical message keys per agent (ms)
    pub min_interval_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1_000,
        }
    }
}
