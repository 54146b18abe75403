//! Possession resolution tuning.
//!
//! Rates are per possession segment (one shot attempt or turnover chance).
//! Rating terms are per point above or below a neutral 50.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    /// Probability band floor (default: 0.02)
    pub probability_floor: f64,
    /// Probability band ceiling (default: 0.98)
    pub probability_ceiling: f64,

    // === Shots ===
    pub rim_base: f64,
    pub mid_range_base: f64,
    pub three_base: f64,
    pub post_base: f64,
    /// Make probability per shooter rating point (default: 0.004)
    pub skill_weight: f64,
    /// Make probability lost per defender rating point (default: 0.003)
    pub contest_weight: f64,
    /// Penalty for a forced shot at the shot-clock buzzer (default: 0.08)
    pub forced_shot_penalty: f64,
    /// Extra make chance on an assisted look (default: 0.03)
    pub assisted_bonus: f64,

    // === Turnovers & steals ===
    pub turnover_base: f64,
    /// Turnover change per point of ball_handling minus 50 (default: 0.0015)
    pub ball_security_weight: f64,
    /// Share of turnovers credited as a steal at neutral ratings (default: 0.5)
    pub steal_share: f64,
    /// Chance a clock violation happens instead of a forced shot (default: 0.35)
    pub violation_rate: f64,

    // === Fouls ===
    pub shooting_foul_base: f64,
    pub non_shooting_foul_base: f64,
    /// Foul change per point of defender aggression minus 50 (default: 0.0015)
    pub aggression_weight: f64,
    /// Per committed personal foul, defenders play this much softer (default: 0.15)
    pub foul_caution: f64,
    /// Free throw make chance at rating 0; each point adds `free_throw_weight`
    pub free_throw_base: f64,
    pub free_throw_weight: f64,
    /// Team fouls in a period that put the opponent in the bonus (default: 5)
    pub bonus_team_fouls: u8,
    /// Personal fouls that disqualify a player (default: 6)
    pub foul_out_limit: u8,
    /// Bench at or above this many fouls in Q1, Q2, Q3, Q4/OT (default: 2/3/4/5)
    pub foul_trouble: [u8; 4],

    // === Misses ===
    pub block_base: f64,
    pub block_weight: f64,
    pub offensive_rebound_base: f64,
    /// Height advantage per inch in the rebound contest (default: 0.01)
    pub rebound_height_weight: f64,
    /// Offensive rebound retries before the possession ends (default: 3)
    pub max_offensive_rebounds: u8,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            probability_floor: 0.02,
            probability_ceiling: 0.98,

            rim_base: 0.60,
            mid_range_base: 0.40,
            three_base: 0.33,
            post_base: 0.46,
            skill_weight: 0.004,
            contest_weight: 0.003,
            forced_shot_penalty: 0.08,
            assisted_bonus: 0.03,

            turnover_base: 0.13,
            ball_security_weight: 0.0015,
            steal_share: 0.5,
            violation_rate: 0.35,

            shooting_foul_base: 0.10,
            non_shooting_foul_base: 0.06,
            aggression_weight: 0.0015,
            foul_caution: 0.15,
            free_throw_base: 0.40,
            free_throw_weight: 0.0055,
            bonus_team_fouls: 5,
            foul_out_limit: 6,
            foul_trouble: [2, 3, 4, 5],

            block_base: 0.07,
            block_weight: 0.002,
            offensive_rebound_base: 0.26,
            rebound_height_weight: 0.01,
            max_offensive_rebounds: 3,
        }
    }
}

impl PossessionConfig {
    /// Foul-trouble threshold for a 1-based period; overtime uses the Q4 value.
    pub fn foul_trouble_limit(&self, period: u8) -> u8 {
        let idx = (period.max(1) as usize - 1).min(self.foul_trouble.len() - 1);
        self.foul_trouble[idx]
    }
}
