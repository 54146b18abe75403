//! Fatigue and rotation parameters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Fatigue gained per on-court possession of reference length (default: 2.4)
    pub gain_per_possession: f32,
    /// Possession length the gain is calibrated for, in seconds (default: 16)
    pub reference_possession_secs: f32,
    /// How strongly the stamina attribute dampens gain (default: 1.0)
    pub stamina_impact: f32,
    /// Recovery per possession spent on the bench (default: 2.2)
    pub bench_recovery: f32,
    /// Recovery for everyone between quarters (default: 10)
    pub period_break_recovery: f32,
    /// Recovery for everyone at halftime (default: 25)
    pub halftime_recovery: f32,
    /// Recovery for on-court players when a timeout is called (default: 5)
    pub timeout_recovery: f32,
    /// Fatigue at which effective ratings start dropping (default: 30)
    pub penalty_onset: f32,
    /// Rating penalty at fatigue 100 (default: 0.25)
    pub max_penalty: f32,
    /// On-court fatigue that triggers a substitution (default: 80)
    pub sub_out_threshold: f32,
    /// Benched starters return once below this (default: 45)
    pub return_threshold: f32,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            gain_per_possession: 2.4,
            reference_possession_secs: 16.0,
            stamina_impact: 1.0,
            bench_recovery: 2.2,
            period_break_recovery: 10.0,
            halftime_recovery: 25.0,
            timeout_recovery: 5.0,
            penalty_onset: 30.0,
            max_penalty: 0.25,
            sub_out_threshold: 80.0,
            return_threshold: 45.0,
        }
    }
}
