//! # Player Evolution
//!
//! Attribute drift between games.
//!
//! - **Micro** (after every game): in-game performance against the player's
//!   season baseline, with hot/cold streak detection over a rolling window.
//! - **Macro** (weekly): age curve toward potential or past the peak into
//!   decline, scaled by minutes and training facilities.
//!
//! Drift is fractional. Progress accumulates per attribute in
//! `Player::evolution_progress` and only whole points move the rating, each
//! recorded as an [`EvolutionEntry`]. Ratings stay within
//! `[attribute_floor, potential]`.

mod history;
mod micro;
mod weekly;

pub use history::{EvolutionCause, EvolutionEntry, EvolutionReport};
pub use micro::{game_score, per_minute_game_score, season_game_score_per_minute};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::engine::config::EvolutionConfig;
use crate::error::EvolutionError;
use crate::models::{Attr, GameResult, Player, MAX_RATING};

pub struct PlayerEvolutionEngine<'a> {
    config: &'a EvolutionConfig,
}

impl<'a> PlayerEvolutionEngine<'a> {
    pub fn new(config: &'a EvolutionConfig) -> Self {
        Self { config }
    }

    /// Micro step for every player in `players` (the rosters that played
    /// `result`). A failing player is skipped and reported.
    pub fn evolve_after_game(
        &self,
        result: &GameResult,
        players: &mut [Player],
        date: NaiveDate,
    ) -> EvolutionReport {
        let mut report = EvolutionReport::default();
        for player in players.iter_mut() {
            let step = match result.box_score.line(player.id) {
                Some(line) => self.apply_game_line(player, line, date),
                None => Err(EvolutionError::MissingLine { player: player.id }),
            };
            match step {
                Ok(entries) => report.entries.extend(entries),
                Err(err) => {
                    warn!(game_id = result.game_id, player = err.player(), error = %err, "evolution skipped");
                    report.skipped.push(err);
                }
            }
        }
        debug!(
            game_id = result.game_id,
            changes = report.entries.len(),
            skipped = report.skipped.len(),
            "post-game evolution"
        );
        report
    }

    fn validate(&self, player: &Player) -> Result<(), EvolutionError> {
        if player.potential > MAX_RATING || player.potential < self.config.attribute_floor {
            return Err(EvolutionError::InvalidPotential {
                player: player.id,
                potential: player.potential,
            });
        }
        if let Some(bad) = player.recent_form.iter().find(|v| !v.is_finite()) {
            return Err(EvolutionError::CorruptHistory {
                player: player.id,
                reason: format!("non-finite recent form value {bad}"),
            });
        }
        let s = &player.season;
        if !s.minutes.is_finite() || s.minutes < 0.0 {
            return Err(EvolutionError::CorruptHistory {
                player: player.id,
                reason: format!("season minutes {}", s.minutes),
            });
        }
        if s.fgm > s.fga || s.tpm > s.tpa || s.ftm > s.fta {
            return Err(EvolutionError::CorruptHistory {
                player: player.id,
                reason: "made shots exceed attempts".to_string(),
            });
        }
        if let Some((attr, rating)) = player.attributes.iter().find(|(_, v)| *v > MAX_RATING) {
            return Err(EvolutionError::CorruptHistory {
                player: player.id,
                reason: format!("{attr:?} rating {rating} above {MAX_RATING}"),
            });
        }
        if let Some((attr, progress)) =
            player.evolution_progress.iter().find(|(_, v)| !v.is_finite())
        {
            return Err(EvolutionError::CorruptHistory {
                player: player.id,
                reason: format!("progress for {attr:?} is {progress}"),
            });
        }
        Ok(())
    }
}

/// Pulls every carried rating back inside `[floor, potential]`, one entry per
/// moved attribute. Progress banked on a moved attribute is dropped.
pub(crate) fn clamp_to_bounds(player: &mut Player, floor: u8, date: NaiveDate) -> Vec<EvolutionEntry> {
    let ceiling = player.potential.min(MAX_RATING);
    let floor = floor.min(ceiling);

    let mut entries = Vec::new();
    for attribute in Attr::ALL {
        let Some(current) = player.attributes.get(attribute) else {
            continue;
        };
        let target = current.clamp(floor, ceiling);
        if target == current {
            continue;
        }
        player.attributes.set(attribute, target);
        player.evolution_progress.insert(attribute, 0.0);
        let delta = (target as i16 - current as i16) as i8;
        debug!(player = player.id, ?attribute, current, target, "rating pulled into bounds");
        entries.push(EvolutionEntry {
            player: player.id,
            category: attribute.category(),
            attribute,
            delta,
            cause: EvolutionCause::BoundsCorrection,
            date,
        });
    }
    entries
}

/// Adds `amount` to the attribute's progress and moves the rating by any
/// whole points, clamped to `[floor, potential]`. Returns the applied change.
///
/// Attributes the player doesn't carry are left alone.
pub(crate) fn apply_drift(player: &mut Player, attr: Attr, amount: f32, floor: u8) -> i8 {
    let Some(current) = player.attributes.get(attr) else {
        return 0;
    };
    if !amount.is_finite() || amount == 0.0 {
        return 0;
    }
    let ceiling = player.potential.min(MAX_RATING);
    let floor = floor.min(ceiling);

    let progress = player.evolution_progress.entry(attr).or_insert(0.0);
    *progress += amount;
    let whole = progress.trunc();
    if whole == 0.0 {
        return 0;
    }

    let target = (current as i32 + whole as i32).clamp(floor as i32, ceiling as i32);
    let applied = target - current as i32;
    if target == floor as i32 || target == ceiling as i32 {
        // Pinned at a bound; don't bank drift against it
        *progress = 0.0;
    } else {
        *progress -= whole;
    }
    player.attributes.set(attr, target as u8);
    applied as i8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::uniform_player;
    use crate::models::Position;
    use proptest::prelude::*;

    #[test]
    fn test_fractions_accumulate_until_whole_point() {
        let mut p = uniform_player(1, "P", Position::SF, 60).with_potential(80);
        assert_eq!(apply_drift(&mut p, Attr::ThreePoint, 0.4, 25), 0);
        assert_eq!(apply_drift(&mut p, Attr::ThreePoint, 0.4, 25), 0);
        assert_eq!(p.rating(Attr::ThreePoint), 60);
        assert_eq!(apply_drift(&mut p, Attr::ThreePoint, 0.4, 25), 1);
        assert_eq!(p.rating(Attr::ThreePoint), 61);
        assert!((p.evolution_progress[&Attr::ThreePoint] - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_drift_never_passes_potential() {
        let mut p = uniform_player(1, "P", Position::SF, 79).with_potential(80);
        assert_eq!(apply_drift(&mut p, Attr::Speed, 3.0, 25), 1);
        assert_eq!(p.rating(Attr::Speed), 80);
        assert_eq!(apply_drift(&mut p, Attr::Speed, 3.0, 25), 0);
        assert_eq!(p.evolution_progress[&Attr::Speed], 0.0);
    }

    #[test]
    fn test_missing_attribute_untouched() {
        let mut p = uniform_player(1, "P", Position::SF, 60);
        p.attributes.mental.remove(&Attr::Clutch);
        assert_eq!(apply_drift(&mut p, Attr::Clutch, 2.0, 25), 0);
        assert!(p.attributes.get(Attr::Clutch).is_none());
    }

    #[test]
    fn test_corrupt_history_detected() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut p = uniform_player(1, "P", Position::SF, 60);
        p.recent_form.push_back(f32::NAN);
        assert!(matches!(engine.validate(&p), Err(EvolutionError::CorruptHistory { .. })));

        let mut p = uniform_player(2, "P", Position::SF, 60).with_potential(10);
        p.recent_form.clear();
        assert!(matches!(engine.validate(&p), Err(EvolutionError::InvalidPotential { .. })));
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 8).unwrap()
    }

    #[test]
    fn test_clamp_pulls_ratings_under_lowered_potential() {
        let mut p = uniform_player(1, "P", Position::SF, 60).with_potential(80);
        p.attributes.set(Attr::Speed, 86);
        p.attributes.set(Attr::Strength, 81);
        p.attributes.set(Attr::Clutch, 20);
        p.evolution_progress.insert(Attr::Speed, 0.7);

        let entries = clamp_to_bounds(&mut p, 25, day());
        assert_eq!(p.rating(Attr::Speed), 80);
        assert_eq!(p.rating(Attr::Strength), 80);
        assert_eq!(p.rating(Attr::Clutch), 25);
        assert_eq!(p.evolution_progress[&Attr::Speed], 0.0);

        let moved: Vec<(Attr, i8)> = entries.iter().map(|e| (e.attribute, e.delta)).collect();
        assert_eq!(moved.len(), 3);
        assert!(moved.contains(&(Attr::Speed, -6)));
        assert!(moved.contains(&(Attr::Strength, -1)));
        assert!(moved.contains(&(Attr::Clutch, 5)));
        assert!(entries.iter().all(|e| e.cause == EvolutionCause::BoundsCorrection && e.date == day()));

        // Already in bounds: nothing to record
        assert!(clamp_to_bounds(&mut p, 25, day()).is_empty());
    }

    #[test]
    fn test_rating_above_cap_is_corrupt() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut p = uniform_player(1, "P", Position::SF, 60);
        p.attributes.set(Attr::Passing, 180);
        assert!(matches!(engine.validate(&p), Err(EvolutionError::CorruptHistory { player: 1, .. })));
    }

    proptest! {
        #[test]
        fn prop_drift_stays_in_bounds(
            start in 25u8..=80,
            headroom in 0u8..=19,
            steps in proptest::collection::vec(-3.0f32..3.0, 1..200),
        ) {
            let potential = start + headroom;
            let mut p = uniform_player(1, "P", Position::PG, start).with_potential(potential);
            for amount in steps {
                apply_drift(&mut p, Attr::MidRange, amount, 25);
                let r = p.rating(Attr::MidRange);
                prop_assert!(r >= 25 && r <= potential);
            }
        }
    }
}
