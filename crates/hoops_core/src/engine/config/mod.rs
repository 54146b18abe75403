//! # Simulation Configuration
//!
//! All tuning constants live here instead of being scattered through the
//! engine. Defaults target roughly 100 possessions per team over 48 minutes.
//!
//! ## Usage
//! ```rust
//! use hoops_core::engine::config::SimConfig;
//!
//! let config = SimConfig::default();
//! let fast = SimConfig::fast_paced();
//! assert!(config.validate().is_ok());
//! assert!(fast.clock.possession_max_secs < config.clock.possession_max_secs);
//! ```

mod batch_config;
mod clock_config;
mod evolution_config;
mod fatigue_config;
mod injury_config;
mod possession_config;

pub use batch_config::BatchConfig;
pub use clock_config::ClockConfig;
pub use evolution_config::EvolutionConfig;
pub use fatigue_config::FatigueConfig;
pub use injury_config::InjuryConfig;
pub use possession_config::PossessionConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Badge stacking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    /// Cap on the summed percentage modifier per attribute (default: 40)
    pub ceiling_pct: f32,
    /// Turn off to measure how much synergies matter (default: true)
    pub synergies_enabled: bool,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self { ceiling_pct: 40.0, synergies_enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    pub clock: ClockConfig,
    pub fatigue: FatigueConfig,
    pub injury: InjuryConfig,
    pub possession: PossessionConfig,
    pub badges: BadgeConfig,
    pub evolution: EvolutionConfig,
    pub batch: BatchConfig,
}

impl SimConfig {
    /// Default league rules.
    pub fn realistic() -> Self {
        Self::default()
    }

    /// Shorter possessions, more threes, quicker legs.
    pub fn fast_paced() -> Self {
        let mut cfg = Self::default();
        cfg.clock.possession_min_secs = 9.0;
        cfg.clock.possession_max_secs = 17.0;
        cfg.possession.three_base = 0.35;
        cfg.fatigue.gain_per_possession = 2.0;
        cfg
    }

    /// No injuries; for tests that compare box scores.
    pub fn injury_free() -> Self {
        let mut cfg = Self::default();
        cfg.injury.base_rate = 0.0;
        cfg
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads `.yaml`/`.yml` as YAML and anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.clock;
        check(c.periods >= 1, "clock.periods", ">= 1", c.periods as f64)?;
        check(c.period_secs > 0.0, "clock.period_secs", "> 0", c.period_secs as f64)?;
        check(c.overtime_secs > 0.0, "clock.overtime_secs", "> 0", c.overtime_secs as f64)?;
        check(
            c.max_overtime_periods >= 1,
            "clock.max_overtime_periods",
            ">= 1",
            c.max_overtime_periods as f64,
        )?;
        check(
            c.periods as u16 + c.max_overtime_periods as u16 <= u8::MAX as u16,
            "clock.max_overtime_periods",
            "<= 255 - periods",
            c.max_overtime_periods as f64,
        )?;
        check(
            c.possession_min_secs > 0.0,
            "clock.possession_min_secs",
            "> 0",
            c.possession_min_secs as f64,
        )?;
        check(
            c.possession_max_secs >= c.possession_min_secs,
            "clock.possession_max_secs",
            ">= possession_min_secs",
            c.possession_max_secs as f64,
        )?;
        check(
            c.shot_clock_secs >= c.possession_min_secs,
            "clock.shot_clock_secs",
            ">= possession_min_secs",
            c.shot_clock_secs as f64,
        )?;
        check(
            c.quick_shot_min_secs > 0.0,
            "clock.quick_shot_min_secs",
            "> 0",
            c.quick_shot_min_secs as f64,
        )?;

        let f = &self.fatigue;
        check(
            f.reference_possession_secs > 0.0,
            "fatigue.reference_possession_secs",
            "> 0",
            f.reference_possession_secs as f64,
        )?;
        check(
            (0.0..=1.0).contains(&f.max_penalty),
            "fatigue.max_penalty",
            "within [0, 1]",
            f.max_penalty as f64,
        )?;
        check(
            (0.0..100.0).contains(&f.penalty_onset),
            "fatigue.penalty_onset",
            "within [0, 100)",
            f.penalty_onset as f64,
        )?;
        check(
            f.return_threshold < f.sub_out_threshold,
            "fatigue.return_threshold",
            "< sub_out_threshold",
            f.return_threshold as f64,
        )?;

        let i = &self.injury;
        check(
            (0.0..=1.0).contains(&i.base_rate),
            "injury.base_rate",
            "within [0, 1]",
            i.base_rate,
        )?;
        check(
            i.severity_weights.iter().all(|w| *w >= 0.0)
                && i.severity_weights.iter().sum::<f64>() > 0.0,
            "injury.severity_weights",
            "non-negative with a positive sum",
            i.severity_weights.iter().sum::<f64>(),
        )?;

        let p = &self.possession;
        check(
            0.0 <= p.probability_floor && p.probability_floor < p.probability_ceiling,
            "possession.probability_floor",
            "within [0, probability_ceiling)",
            p.probability_floor,
        )?;
        check(
            p.probability_ceiling <= 1.0,
            "possession.probability_ceiling",
            "<= 1",
            p.probability_ceiling,
        )?;
        check(
            p.foul_out_limit >= 1,
            "possession.foul_out_limit",
            ">= 1",
            p.foul_out_limit as f64,
        )?;

        check(
            self.badges.ceiling_pct >= 0.0,
            "badges.ceiling_pct",
            ">= 0",
            self.badges.ceiling_pct as f64,
        )?;

        let e = &self.evolution;
        check(
            e.nudge_min <= e.nudge_max,
            "evolution.nudge_min",
            "<= nudge_max",
            e.nudge_min as f64,
        )?;
        check(
            e.streak_window >= 1,
            "evolution.streak_window",
            ">= 1",
            e.streak_window as f64,
        )?;
        check(e.noise_sd >= 0.0, "evolution.noise_sd", ">= 0", e.noise_sd as f64)?;
        check(
            e.minutes_reference > 0.0,
            "evolution.minutes_reference",
            "> 0",
            e.minutes_reference as f64,
        )?;

        if let Some(workers) = self.batch.workers {
            check(workers >= 1, "batch.workers", ">= 1", workers as f64)?;
        }

        Ok(())
    }
}

fn check(
    ok: bool,
    field: &'static str,
    expected: &'static str,
    value: f64,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, expected, value })
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = SimConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.clock.periods, 4);
        assert!((cfg.clock.mean_possession_secs() - 16.0).abs() < 0.01);
        assert!((cfg.fatigue.sub_out_threshold - 80.0).abs() < 0.01);
        assert!((cfg.badges.ceiling_pct - 40.0).abs() < 0.01);
        assert_eq!(cfg.possession.max_offensive_rebounds, 3);
    }

    #[test]
    fn test_fast_paced_is_faster() {
        let realistic = SimConfig::realistic();
        let fast = SimConfig::fast_paced();
        assert!(fast.clock.mean_possession_secs() < realistic.clock.mean_possession_secs());
        assert!(fast.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let mut cfg = SimConfig::default();
        cfg.clock.possession_max_secs = 5.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfRange { field: "clock.possession_max_secs", .. })
        ));

        let mut cfg = SimConfig::default();
        cfg.fatigue.return_threshold = 90.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_overtime_limit() {
        assert_eq!(SimConfig::default().clock.max_overtime_periods, 10);

        let mut cfg = SimConfig::default();
        cfg.clock.max_overtime_periods = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfRange { field: "clock.max_overtime_periods", .. })
        ));

        cfg.clock.max_overtime_periods = 252;
        assert!(cfg.validate().is_err());
        cfg.clock.max_overtime_periods = 251;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = SimConfig::from_json_str(r#"{"badges": {"ceiling_pct": 25.0}}"#).unwrap();
        assert!((cfg.badges.ceiling_pct - 25.0).abs() < 0.01);
        assert!(cfg.badges.synergies_enabled);
        assert_eq!(cfg.clock, ClockConfig::default());
    }

    #[test]
    fn test_load_yaml_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "clock:\n  timeouts_per_team: 4\nbatch:\n  workers: 2").unwrap();

        let cfg = SimConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.clock.timeouts_per_team, 4);
        assert_eq!(cfg.batch.workers, Some(2));
        assert_eq!(cfg.batch.resolved_workers(), 2);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        assert!(matches!(SimConfig::from_json_str("{not json"), Err(ConfigError::Parse(_))));
        let err = SimConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_serialization() {
        let cfg = SimConfig::fast_paced();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cfg);
    }
}
