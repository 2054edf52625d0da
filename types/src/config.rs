//! Analysis thresholds and windows.
//!
//! Every constant the engine uses to bound a time window or a spatial
//! radius lives here so a run can be tuned from a TOML file. Missing keys
//! fall back to the defaults below, so a partial file is always valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub fights: FightConfig,
    pub wards: WardConfig,
    pub vision: VisionConfig,
    pub objectives: ObjectiveConfig,
    pub economy: EconomyConfig,

    /// Minimum match-clock spacing between two position samples of one hero.
    pub position_sample_secs: i64,
    /// Half-width of the window around a Roshan kill.
    pub roshan_window_secs: i64,
    /// A CC interval counts as "near death" when it ends this close before a death.
    pub cc_near_death_secs: i64,
    /// End of the laning window used by the role guess.
    pub early_game_end_secs: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fights: FightConfig::default(),
            wards: WardConfig::default(),
            vision: VisionConfig::default(),
            objectives: ObjectiveConfig::default(),
            economy: EconomyConfig::default(),
            position_sample_secs: 2,
            roshan_window_secs: 60,
            cc_near_death_secs: 2,
            early_game_end_secs: 7 * 60,
        }
    }
}

/// Fight segmentation and enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FightConfig {
    /// A gap strictly longer than this between combat events closes a fight.
    pub gap_secs: i64,
    /// Economy grants up to this long after a fight still count toward its swing.
    pub swing_tail_secs: i64,
    /// Damage dealt to a victim this long before its death earns an assist.
    pub assist_window_secs: i64,
    /// Ultimates and buybacks this long after the last event still belong to the fight.
    pub activity_tail_secs: i64,
}

impl Default for FightConfig {
    fn default() -> Self {
        Self {
            gap_secs: 20,
            swing_tail_secs: 20,
            assist_window_secs: 10,
            activity_tail_secs: 2,
        }
    }
}

/// Ward lifecycle and hotspot clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardConfig {
    pub observer_expected_lifetime_secs: i64,
    pub sentry_expected_lifetime_secs: i64,
    /// How far back a sentry placement may be credited for a deward.
    pub deward_lookback_secs: i64,
    /// Neighbourhood radius for hotspot clustering (map units).
    pub hotspot_radius: f64,
    /// Minimum members (the point itself included) for a dense neighbourhood.
    pub hotspot_min_points: usize,
}

impl Default for WardConfig {
    fn default() -> Self {
        Self {
            observer_expected_lifetime_secs: 420,
            sentry_expected_lifetime_secs: 90,
            deward_lookback_secs: 60,
            hotspot_radius: 1200.0,
            hotspot_min_points: 3,
        }
    }
}

/// Vision-impact scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Length of the post-placement window.
    pub window_secs: i64,
    /// Spatial radius around the ward (map units).
    pub radius: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            radius: 1600.0,
        }
    }
}

/// Objective chaining and pickoff linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    /// A gap strictly longer than this starts a new chain.
    pub chain_gap_secs: i64,
    /// Economy grants in this window after an objective form its swing.
    pub swing_window_secs: i64,
    /// A hero death at most this long before a building kill is a pickoff.
    pub pickoff_window_secs: i64,
    /// A fight contains an objective when the objective falls in
    /// `[start - fight_lead_secs, end + fight_trail_secs]`.
    pub fight_lead_secs: i64,
    pub fight_trail_secs: i64,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            chain_gap_secs: 15,
            swing_window_secs: 90,
            pickoff_window_secs: 45,
            fight_lead_secs: 5,
            fight_trail_secs: 10,
        }
    }
}

/// Economy lead series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub bucket_secs: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self { bucket_secs: 60 }
    }
}
