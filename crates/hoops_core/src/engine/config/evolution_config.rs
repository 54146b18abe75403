//! Player development tuning.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// No attribute evolves below this rating (default: 25)
    pub attribute_floor: u8,

    // === Micro (per game) ===
    /// Games shorter than this don't count (default: 6 minutes)
    pub min_minutes: f32,
    /// Smallest and largest per-game nudge (default: 0.1 / 0.5)
    pub nudge_min: f32,
    pub nudge_max: f32,
    /// Per-minute game score gap that maps to the largest nudge (default: 0.25)
    pub nudge_full_scale: f32,
    /// Gap below which a game counts as neither over nor under (default: 0.03)
    pub neutral_band: f32,
    /// Recent-form window (default: 5 games)
    pub streak_window: usize,
    /// Streak nudges are multiplied by this (default: 1.5)
    pub streak_multiplier: f32,

    // === Macro (weekly) ===
    /// Peak age; growth stops, later ages regress (default: 28)
    pub peak_age: u8,
    /// Regression starts past this age (default: 30)
    pub decline_age: u8,
    /// Weekly growth per attribute at the youngest ages, before scaling (default: 0.45)
    pub growth_rate: f32,
    /// Weekly decline per attribute per year past `decline_age` (default: 0.06)
    pub decline_rate: f32,
    /// Minutes per game that earn full development (default: 30)
    pub minutes_reference: f32,
    /// Minimum development share for players who barely play (default: 0.35)
    pub minutes_floor: f32,
    /// Std-dev of the weekly noise term (default: 0.08)
    pub noise_sd: f32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            attribute_floor: 25,
            min_minutes: 6.0,
            nudge_min: 0.1,
            nudge_max: 0.5,
            nudge_full_scale: 0.25,
            neutral_band: 0.03,
            streak_window: 5,
            streak_multiplier: 1.5,
            peak_age: 28,
            decline_age: 30,
            growth_rate: 0.45,
            decline_rate: 0.06,
            minutes_reference: 30.0,
            minutes_floor: 0.35,
            noise_sd: 0.08,
        }
    }
}
