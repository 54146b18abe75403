//! Weekly development along the age curve.

use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use tracing::{info, warn};

use super::{apply_drift, clamp_to_bounds, EvolutionCause, EvolutionEntry, EvolutionReport, PlayerEvolutionEngine};
use crate::engine::config::EvolutionConfig;
use crate::engine::deterministic::{derive_player_seed, rng_from_seed};
use crate::error::EvolutionError;
use crate::models::{Attr, AttributeCategory, CampaignContext, Player};

/// Youngest age that gets the full growth rate.
const FULL_GROWTH_AGE: u8 = 21;

/// Share of the weekly growth rate at `age`: 1.0 up to 21, falling linearly
/// to 0 at the peak age. Zero for everyone at or past the peak.
pub fn growth_factor(age: u8, cfg: &EvolutionConfig) -> f32 {
    if age >= cfg.peak_age {
        return 0.0;
    }
    let span = cfg.peak_age.saturating_sub(FULL_GROWTH_AGE).max(1) as f32;
    ((cfg.peak_age - age) as f32 / span).clamp(0.0, 1.0)
}

/// Weekly regression per attribute, growing with every year past `decline_age`.
/// Physical attributes fall twice as fast.
pub fn decline_amount(age: u8, attr: Attr, cfg: &EvolutionConfig) -> f32 {
    if age <= cfg.decline_age {
        return 0.0;
    }
    let years = (age - cfg.decline_age) as f32;
    let physical = if attr.category() == AttributeCategory::Physical { 2.0 } else { 1.0 };
    cfg.decline_rate * years * physical
}

/// Minutes share in `[minutes_floor, 1]` from season minutes per game.
pub fn minutes_share(player: &Player, cfg: &EvolutionConfig) -> f32 {
    let s = &player.season;
    if s.games == 0 || cfg.minutes_reference <= 0.0 {
        return cfg.minutes_floor;
    }
    let mpg = s.minutes / s.games as f32;
    (mpg / cfg.minutes_reference).clamp(cfg.minutes_floor, 1.0)
}

impl PlayerEvolutionEngine<'_> {
    /// Macro step for a whole league. Players evolve in parallel; each draws
    /// noise from its own stream derived from `(ctx.seed, ctx.week, id)`, so
    /// the result doesn't depend on thread scheduling.
    pub fn evolve_week(&self, players: &mut [Player], ctx: &CampaignContext) -> EvolutionReport {
        let steps: Vec<Result<Vec<EvolutionEntry>, EvolutionError>> =
            players.par_iter_mut().map(|player| self.evolve_player_week(player, ctx)).collect();

        let mut report = EvolutionReport::default();
        for step in steps {
            match step {
                Ok(entries) => report.entries.extend(entries),
                Err(err) => {
                    warn!(player = err.player(), error = %err, "weekly evolution skipped");
                    report.skipped.push(err);
                }
            }
        }
        info!(
            season = ctx.season,
            week = ctx.week,
            players = players.len(),
            changes = report.entries.len(),
            skipped = report.skipped.len(),
            "weekly evolution"
        );
        report
    }

    pub fn evolve_player_week(
        &self,
        player: &mut Player,
        ctx: &CampaignContext,
    ) -> Result<Vec<EvolutionEntry>, EvolutionError> {
        self.validate(player)?;
        let cfg = self.config;
        let mut rng = rng_from_seed(derive_player_seed(ctx.seed, ctx.week, player.id));
        let noise = Normal::new(0.0f32, cfg.noise_sd.max(0.0)).ok();

        let growth = cfg.growth_rate
            * growth_factor(player.age, cfg)
            * minutes_share(player, cfg)
            * ctx.facility_multiplier();

        let mut entries = clamp_to_bounds(player, cfg.attribute_floor, ctx.date);
        for attribute in Attr::ALL {
            let Some(current) = player.attributes.get(attribute) else {
                continue;
            };
            // Growth slows as the rating closes on potential
            let headroom = (player.potential.saturating_sub(current) as f32 / 10.0).clamp(0.0, 1.0);
            let drift = growth * headroom - decline_amount(player.age, attribute, cfg);
            let jitter = noise.map(|n| n.sample(&mut rng)).unwrap_or(0.0);

            let amount = drift + jitter;
            let delta = apply_drift(player, attribute, amount, cfg.attribute_floor);
            if delta != 0 {
                entries.push(EvolutionEntry {
                    player: player.id,
                    category: attribute.category(),
                    attribute,
                    delta,
                    cause: if delta > 0 { EvolutionCause::AgeGrowth } else { EvolutionCause::AgeDecline },
                    date: ctx.date,
                });
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::uniform_player;
    use crate::models::{Position, StatCounters};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn ctx(week: u16) -> CampaignContext {
        CampaignContext::new(2025, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(), 99).with_week(week)
    }

    fn starter(id: u32, age: u8, rating: u8, potential: u8) -> Player {
        let mut p = uniform_player(id, "P", Position::SF, rating).with_potential(potential);
        p.age = age;
        p.season = StatCounters { games: 10, minutes: 320.0, ..Default::default() };
        p
    }

    #[test]
    fn test_age_curve_shape() {
        let cfg = EvolutionConfig::default();
        assert_eq!(growth_factor(20, &cfg), 1.0);
        assert!(growth_factor(25, &cfg) > 0.0 && growth_factor(25, &cfg) < 1.0);
        assert_eq!(growth_factor(28, &cfg), 0.0);
        assert_eq!(decline_amount(29, Attr::Speed, &cfg), 0.0);
        assert!(decline_amount(34, Attr::Speed, &cfg) > decline_amount(34, Attr::Passing, &cfg));
    }

    #[test]
    fn test_weekly_step_clamps_ratings_above_potential() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut p = starter(3, 30, 84, 80);

        let entries = engine.evolve_player_week(&mut p, &ctx(1)).unwrap();
        let corrections: Vec<&EvolutionEntry> =
            entries.iter().filter(|e| e.cause == EvolutionCause::BoundsCorrection).collect();
        assert_eq!(corrections.len(), Attr::ALL.len());
        assert!(corrections.iter().all(|e| e.delta == -4 && e.date == ctx(1).date));
        assert!(p.attributes.iter().all(|(_, r)| r <= 80));
    }

    #[test]
    fn test_young_players_grow_old_players_decline() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut players = vec![starter(1, 20, 60, 85), starter(2, 35, 70, 80)];

        let mut report = EvolutionReport::default();
        for week in 1..=10 {
            report.merge(engine.evolve_week(&mut players, &ctx(week)));
        }
        let young: i32 = Attr::ALL.iter().map(|a| report.net_delta(1, *a)).sum();
        let old: i32 = Attr::ALL.iter().map(|a| report.net_delta(2, *a)).sum();
        assert!(young > 0, "young net {young}");
        assert!(old < 0, "old net {old}");
        assert!(report
            .for_player(2)
            .all(|e| e.date == NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()));
    }

    #[test]
    fn test_weekly_is_deterministic() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let build = || (1..=40).map(|id| starter(id, 19 + (id % 18) as u8, 65, 85)).collect::<Vec<_>>();

        let mut a = build();
        let mut b = build();
        let ra = engine.evolve_week(&mut a, &ctx(3));
        let rb = engine.evolve_week(&mut b, &ctx(3));
        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_player_skipped_others_evolve() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut bad = starter(1, 20, 60, 85);
        bad.recent_form.push_back(f32::INFINITY);
        let mut players = vec![bad, starter(2, 20, 60, 85)];
        let before = players[0].clone();

        let mut report = EvolutionReport::default();
        for week in 1..=5 {
            report.merge(engine.evolve_week(&mut players, &ctx(week)));
        }
        assert_eq!(players[0], before);
        assert!(report.skipped_players().iter().all(|id| *id == 1));
        assert_eq!(report.skipped.len(), 5);
        assert!(report.for_player(2).count() > 0);
    }

    #[test]
    fn test_facility_level_speeds_growth() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut poor = vec![starter(1, 20, 60, 90)];
        let mut elite = vec![starter(1, 20, 60, 90)];
        for week in 1..=8 {
            engine.evolve_week(&mut poor, &ctx(week).with_facility_level(0));
            engine.evolve_week(&mut elite, &ctx(week).with_facility_level(5));
        }
        assert!(elite[0].overall() > poor[0].overall());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn prop_weekly_bounds_hold(age in 18u8..40, rating in 25u8..=90, headroom in 0u8..=9, weeks in 1u16..30) {
            let cfg = EvolutionConfig::default();
            let engine = PlayerEvolutionEngine::new(&cfg);
            let potential = rating.saturating_add(headroom).min(99);
            let mut players = vec![starter(7, age, rating, potential)];
            for week in 1..=weeks {
                engine.evolve_week(&mut players, &ctx(week));
                for (_, r) in players[0].attributes.iter() {
                    prop_assert!(r >= cfg.attribute_floor && r <= potential);
                }
            }
        }
    }
}
