//! Probability formulas used by the possession engine.
//!
//! Everything here is a pure function of ratings and config. Ratings are on
//! the 0-99 scale; terms are expressed relative to a neutral 50. Every
//! possession probability goes through [`clamp_band`].

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::config::{FatigueConfig, InjuryConfig, PossessionConfig};
use crate::models::{InjuryRisk, ShotKind, MAX_FATIGUE};

const NEUTRAL: f32 = 50.0;

/// Clamp into `[floor, ceiling]`. NaN collapses to the floor.
pub fn clamp_band(p: f64, cfg: &PossessionConfig) -> f64 {
    if p.is_nan() {
        return cfg.probability_floor;
    }
    p.clamp(cfg.probability_floor, cfg.probability_ceiling)
}

/// Share of a rating lost to fatigue, 0 below the onset and `max_penalty` at 100.
pub fn fatigue_penalty(fatigue: f32, cfg: &FatigueConfig) -> f32 {
    let f = fatigue.clamp(0.0, MAX_FATIGUE);
    if f <= cfg.penalty_onset {
        return 0.0;
    }
    (f - cfg.penalty_onset) / (MAX_FATIGUE - cfg.penalty_onset) * cfg.max_penalty
}

/// base x (1 + badge%) x (1 - fatigue penalty)
pub fn effective_rating(base: u8, modifier_pct: f32, fatigue: f32, cfg: &FatigueConfig) -> f32 {
    base as f32 * (1.0 + modifier_pct / 100.0) * (1.0 - fatigue_penalty(fatigue, cfg))
}

pub fn shot_base(kind: ShotKind, cfg: &PossessionConfig) -> f64 {
    match kind {
        ShotKind::Rim => cfg.rim_base,
        ShotKind::MidRange => cfg.mid_range_base,
        ShotKind::Three => cfg.three_base,
        ShotKind::Post => cfg.post_base,
    }
}

/// Make chance from shooter skill, the contesting defender and a situational
/// quality adjustment (assisted look, forced shot, clutch).
pub fn shot_make_probability(
    kind: ShotKind,
    shooter: f32,
    defender: f32,
    quality: f64,
    cfg: &PossessionConfig,
) -> f64 {
    let skill = (shooter - NEUTRAL) as f64 * cfg.skill_weight;
    let contest = (defender - NEUTRAL) as f64 * cfg.contest_weight;
    clamp_band(shot_base(kind, cfg) + skill - contest + quality, cfg)
}

pub fn free_throw_probability(shooter: f32, cfg: &PossessionConfig) -> f64 {
    clamp_band(cfg.free_throw_base + shooter as f64 * cfg.free_throw_weight, cfg)
}

pub fn turnover_probability(ball_handling: f32, pressure: f32, cfg: &PossessionConfig) -> f64 {
    let security = (ball_handling - NEUTRAL) as f64 * cfg.ball_security_weight;
    clamp_band((cfg.turnover_base - security) * pressure as f64, cfg)
}

/// Chance that a turnover is a steal credited to `defender`.
pub fn steal_probability(defender_steal: f32, cfg: &PossessionConfig) -> f64 {
    clamp_band(cfg.steal_share + (defender_steal - NEUTRAL) as f64 * 0.006, cfg)
}

/// Foul chance for a defender. Players carrying fouls defend more carefully.
pub fn foul_probability(
    base: f64,
    aggression: f32,
    fouls_committed: u8,
    pressure: f32,
    cfg: &PossessionConfig,
) -> f64 {
    let aggressive = (aggression - NEUTRAL) as f64 * cfg.aggression_weight;
    let caution = 1.0 / (1.0 + fouls_committed as f64 * cfg.foul_caution);
    clamp_band((base + aggressive) * caution * pressure as f64, cfg)
}

pub fn block_probability(blocker: f32, cfg: &PossessionConfig) -> f64 {
    clamp_band(cfg.block_base + (blocker - NEUTRAL) as f64 * cfg.block_weight, cfg)
}

/// Offensive rebound chance from mean effective rebounding and mean height (inches).
pub fn offensive_rebound_probability(
    offense_rebounding: f32,
    defense_rebounding: f32,
    height_diff_in: f32,
    cfg: &PossessionConfig,
) -> f64 {
    let skill = (offense_rebounding - defense_rebounding) as f64 * 0.005;
    let height = height_diff_in as f64 * cfg.rebound_height_weight;
    clamp_band(cfg.offensive_rebound_base + skill + height, cfg)
}

/// Per-possession injury chance. Strictly increasing in fatigue.
pub fn injury_probability(risk: InjuryRisk, fatigue: f32, cfg: &InjuryConfig) -> f64 {
    let f = (fatigue.clamp(0.0, MAX_FATIGUE) / MAX_FATIGUE) as f64;
    let p = cfg.base_rate * cfg.risk_multiplier(risk) * (1.0 + f * f * cfg.fatigue_scale);
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

/// Weighted draw. Falls back to a uniform pick when the weights are unusable
/// (empty sum, negative or non-finite values).
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    if weights.is_empty() {
        return 0;
    }
    match WeightedIndex::new(weights.iter().map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 })) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.gen_range(0..weights.len()),
    }
}

/// Bernoulli roll on an already-clamped probability.
pub fn roll<R: Rng + ?Sized>(p: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() < p
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pcfg() -> PossessionConfig {
        PossessionConfig::default()
    }

    #[test]
    fn test_clamp_band_handles_extremes() {
        let cfg = pcfg();
        assert_eq!(clamp_band(-3.0, &cfg), 0.02);
        assert_eq!(clamp_band(7.0, &cfg), 0.98);
        assert_eq!(clamp_band(f64::NAN, &cfg), 0.02);
        assert_eq!(clamp_band(0.5, &cfg), 0.5);
    }

    #[test]
    fn test_fatigue_penalty_shape() {
        let cfg = FatigueConfig::default();
        assert_eq!(fatigue_penalty(0.0, &cfg), 0.0);
        assert_eq!(fatigue_penalty(30.0, &cfg), 0.0);
        assert!((fatigue_penalty(100.0, &cfg) - 0.25).abs() < 1e-6);
        assert!(fatigue_penalty(80.0, &cfg) > fatigue_penalty(50.0, &cfg));
    }

    #[test]
    fn test_effective_rating_combines_badge_and_fatigue() {
        let cfg = FatigueConfig::default();
        assert!((effective_rating(80, 0.0, 0.0, &cfg) - 80.0).abs() < 1e-4);
        assert!((effective_rating(80, 10.0, 0.0, &cfg) - 88.0).abs() < 1e-4);
        assert!((effective_rating(80, 0.0, 100.0, &cfg) - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_better_shooter_makes_more() {
        let cfg = pcfg();
        let good = shot_make_probability(ShotKind::Three, 90.0, 60.0, 0.0, &cfg);
        let poor = shot_make_probability(ShotKind::Three, 40.0, 60.0, 0.0, &cfg);
        assert!(good > poor);
        let contested = shot_make_probability(ShotKind::Three, 90.0, 95.0, 0.0, &cfg);
        assert!(contested < good);
    }

    #[test]
    fn test_injury_probability_rises_with_fatigue() {
        let cfg = InjuryConfig::default();
        let fresh = injury_probability(InjuryRisk::High, 20.0, &cfg);
        let tired = injury_probability(InjuryRisk::High, 95.0, &cfg);
        assert!(tired > fresh);
        assert!(
            injury_probability(InjuryRisk::High, 50.0, &cfg)
                > injury_probability(InjuryRisk::Low, 50.0, &cfg)
        );
    }

    #[test]
    fn test_foul_caution_reduces_rate() {
        let cfg = pcfg();
        let clean = foul_probability(cfg.shooting_foul_base, 70.0, 0, 1.0, &cfg);
        let loaded = foul_probability(cfg.shooting_foul_base, 70.0, 5, 1.0, &cfg);
        assert!(loaded < clean);
    }

    #[test]
    fn test_weighted_index_falls_back_on_zero_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..20 {
            assert!(weighted_index(&[0.0, 0.0, 0.0], &mut rng) < 3);
        }
        assert_eq!(weighted_index(&[0.0, 1.0, 0.0], &mut rng), 1);
        assert_eq!(weighted_index(&[], &mut rng), 0);
    }

    proptest! {
        #[test]
        fn prop_shot_probability_in_band(
            shooter in -50.0f32..200.0,
            defender in -50.0f32..200.0,
            quality in -2.0f64..2.0,
            kind in prop_oneof![
                Just(ShotKind::Rim),
                Just(ShotKind::MidRange),
                Just(ShotKind::Three),
                Just(ShotKind::Post)
            ],
        ) {
            let cfg = PossessionConfig::default();
            let p = shot_make_probability(kind, shooter, defender, quality, &cfg);
            prop_assert!((0.02..=0.98).contains(&p));
        }

        #[test]
        fn prop_other_probabilities_in_band(
            rating in 0.0f32..140.0,
            other in 0.0f32..140.0,
            fouls in 0u8..10,
            pressure in 0.0f32..3.0,
        ) {
            let cfg = PossessionConfig::default();
            for p in [
                free_throw_probability(rating, &cfg),
                turnover_probability(rating, pressure, &cfg),
                steal_probability(rating, &cfg),
                foul_probability(cfg.non_shooting_foul_base, rating, fouls, pressure, &cfg),
                block_probability(rating, &cfg),
                offensive_rebound_probability(rating, other, rating - other, &cfg),
            ] {
                prop_assert!((0.02..=0.98).contains(&p));
            }
        }

        #[test]
        fn prop_injury_monotonic_in_fatigue(a in 0.0f32..100.0, b in 0.0f32..100.0) {
            let cfg = InjuryConfig::default();
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assume!(hi - lo > 0.01);
            prop_assert!(
                injury_probability(InjuryRisk::Medium, hi, &cfg)
                    > injury_probability(InjuryRisk::Medium, lo, &cfg)
            );
        }
    }
}
