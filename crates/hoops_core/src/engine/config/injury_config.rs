//! Injury roll parameters.

use serde::{Deserialize, Serialize};

use crate::models::{InjuryRisk, InjurySeverity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjuryConfig {
    /// Base injury chance per on-court player per possession (default: 0.00006)
    pub base_rate: f64,
    /// Extra risk at fatigue 100, applied quadratically (default: 2.0)
    pub fatigue_scale: f64,
    /// Risk multipliers for L/M/H tiers (default: 0.6 / 1.0 / 1.8)
    pub low_risk: f64,
    pub medium_risk: f64,
    pub high_risk: f64,
    /// Severity weights minor/moderate/severe/season-ending (default: .62/.26/.09/.03)
    pub severity_weights: [f64; 4],
    /// Games-out ranges (inclusive) per severity
    pub minor_games: (u16, u16),
    pub moderate_games: (u16, u16),
    pub severe_games: (u16, u16),
    pub season_ending_games: (u16, u16),
}

impl Default for InjuryConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.00006,
            fatigue_scale: 2.0,
            low_risk: 0.6,
            medium_risk: 1.0,
            high_risk: 1.8,
            severity_weights: [0.62, 0.26, 0.09, 0.03],
            minor_games: (1, 3),
            moderate_games: (4, 10),
            severe_games: (11, 30),
            season_ending_games: (50, 82),
        }
    }
}

impl InjuryConfig {
    pub fn risk_multiplier(&self, risk: InjuryRisk) -> f64 {
        match risk {
            InjuryRisk::Low => self.low_risk,
            InjuryRisk::Medium => self.medium_risk,
            InjuryRisk::High => self.high_risk,
        }
    }

    pub fn games_out(&self, severity: InjurySeverity) -> (u16, u16) {
        match severity {
            InjurySeverity::Minor => self.minor_games,
            InjurySeverity::Moderate => self.moderate_games,
            InjurySeverity::Severe => self.severe_games,
            InjurySeverity::SeasonEnding => self.season_ending_games,
        }
    }
}
