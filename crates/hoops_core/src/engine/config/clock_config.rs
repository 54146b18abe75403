//! Game clock and possession pacing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Regulation periods (default: 4)
    pub periods: u8,
    /// Length of a regulation period in seconds (default: 720)
    pub period_secs: f32,
    /// Length of an overtime period in seconds (default: 300)
    pub overtime_secs: f32,
    /// Overtime periods before a still-tied game fails (default: 10)
    pub max_overtime_periods: u8,
    /// Shot clock in seconds (default: 24)
    pub shot_clock_secs: f32,
    /// Lower bound of sampled possession length (default: 12)
    pub possession_min_secs: f32,
    /// Upper bound of sampled possession length (default: 20)
    pub possession_max_secs: f32,
    /// Putback/reset time after an offensive rebound, sampled up to this (default: 8)
    pub putback_max_secs: f32,
    /// Time left in the period under which offenses hurry (default: 24)
    pub quick_shot_window_secs: f32,
    /// Fastest possible possession (default: 2)
    pub quick_shot_min_secs: f32,
    /// Timeouts per team per game (default: 7)
    pub timeouts_per_team: u8,
    /// Unanswered opponent points that trigger a timeout (default: 8)
    pub timeout_run_trigger: u16,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            periods: 4,
            period_secs: 720.0,
            overtime_secs: 300.0,
            max_overtime_periods: 10,
            shot_clock_secs: 24.0,
            possession_min_secs: 12.0,
            possession_max_secs: 20.0,
            putback_max_secs: 8.0,
            quick_shot_window_secs: 24.0,
            quick_shot_min_secs: 2.0,
            timeouts_per_team: 7,
            timeout_run_trigger: 8,
        }
    }
}

impl ClockConfig {
    /// Mean of the possession-length band.
    pub fn mean_possession_secs(&self) -> f32 {
        (self.possession_min_secs + self.possession_max_secs) / 2.0
    }

    pub fn period_length(&self, period: u8) -> f32 {
        if period <= self.periods {
            self.period_secs
        } else {
            self.overtime_secs
        }
    }
}
