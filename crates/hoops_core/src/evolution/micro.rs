//! Per-game development.
//!
//! Performance is Hollinger's game score per minute, compared against the
//! player's season average. The rolling `recent_form` window turns a run of
//! same-direction games into a streak with a larger nudge.

use chrono::NaiveDate;

use super::{apply_drift, clamp_to_bounds, EvolutionCause, EvolutionEntry, PlayerEvolutionEngine};
use crate::engine::config::EvolutionConfig;
use crate::error::EvolutionError;
use crate::models::{Attr, BoxLine, Player, StatCounters};

/// PTS + 0.4 FGM - 0.7 FGA - 0.4 (FTA - FTM) + 0.7 ORB + 0.3 DRB + STL
/// + 0.7 AST + 0.7 BLK - 0.4 PF - TOV
pub fn game_score(line: &BoxLine) -> f32 {
    hollinger(
        line.points as f32,
        line.fgm as f32,
        line.fga as f32,
        line.ftm as f32,
        line.fta as f32,
        line.oreb as f32,
        line.dreb as f32,
        line.stl as f32,
        line.ast as f32,
        line.blk as f32,
        line.pf as f32,
        line.tov as f32,
    )
}

pub fn per_minute_game_score(line: &BoxLine) -> Option<f32> {
    let minutes = line.minutes();
    (minutes > 0.0).then(|| game_score(line) / minutes)
}

/// Season baseline from accumulated counters.
pub fn season_game_score_per_minute(c: &StatCounters) -> Option<f32> {
    if c.minutes <= 0.0 {
        return None;
    }
    let total = hollinger(
        c.points as f32,
        c.fgm as f32,
        c.fga as f32,
        c.ftm as f32,
        c.fta as f32,
        c.offensive_rebounds as f32,
        c.defensive_rebounds as f32,
        c.steals as f32,
        c.assists as f32,
        c.blocks as f32,
        c.fouls as f32,
        c.turnovers as f32,
    );
    Some(total / c.minutes)
}

#[allow(clippy::too_many_arguments)]
fn hollinger(
    pts: f32,
    fgm: f32,
    fga: f32,
    ftm: f32,
    fta: f32,
    orb: f32,
    drb: f32,
    stl: f32,
    ast: f32,
    blk: f32,
    pf: f32,
    tov: f32,
) -> f32 {
    pts + 0.4 * fgm - 0.7 * fga - 0.4 * (fta - ftm) + 0.7 * orb + 0.3 * drb + stl + 0.7 * ast
        + 0.7 * blk
        - 0.4 * pf
        - tov
}

/// Cause and signed nudge for a game `gap` above/below baseline, or `None`
/// inside the neutral band. `form` already includes this game.
pub(crate) fn classify(
    gap: f32,
    form: &[f32],
    baseline: f32,
    cfg: &EvolutionConfig,
) -> Option<(EvolutionCause, f32)> {
    if !gap.is_finite() || gap.abs() < cfg.neutral_band {
        return None;
    }
    let over = gap > 0.0;
    let scale = (gap.abs() / cfg.nudge_full_scale).clamp(0.0, 1.0);
    let mut nudge = cfg.nudge_min + (cfg.nudge_max - cfg.nudge_min) * scale;

    let streak = form.len() >= cfg.streak_window
        && form.iter().all(|v| {
            let g = v - baseline;
            if over {
                g >= cfg.neutral_band
            } else {
                g <= -cfg.neutral_band
            }
        });
    let cause = match (over, streak) {
        (true, true) => EvolutionCause::HotStreak,
        (true, false) => EvolutionCause::Overperformance,
        (false, true) => EvolutionCause::ColdStreak,
        (false, false) => EvolutionCause::Underperformance,
    };
    if streak {
        nudge *= cfg.streak_multiplier;
    }
    Some((cause, if over { nudge } else { -nudge }))
}

/// Attributes behind a good game.
fn credited_attributes(line: &BoxLine) -> Vec<Attr> {
    let mut attrs = Vec::new();
    if line.tpm > 0 {
        attrs.push(Attr::ThreePoint);
    }
    if line.fgm > line.tpm {
        attrs.push(Attr::InsideScoring);
    }
    if line.ftm > 0 && line.ftm * 4 >= line.fta * 3 {
        attrs.push(Attr::FreeThrow);
    }
    if line.ast >= 3 {
        attrs.push(Attr::Passing);
    }
    if line.oreb >= 2 {
        attrs.push(Attr::OffensiveRebound);
    }
    if line.dreb >= 4 {
        attrs.push(Attr::DefensiveRebound);
    }
    if line.stl >= 2 {
        attrs.push(Attr::Steal);
    }
    if line.blk >= 2 {
        attrs.push(Attr::Block);
    }
    if attrs.is_empty() {
        attrs.push(Attr::BasketballIq);
    }
    attrs
}

/// Attributes behind a poor game.
fn faulted_attributes(line: &BoxLine) -> Vec<Attr> {
    let mut attrs = Vec::new();
    if line.tpa >= 3 && line.tpm * 3 < line.tpa {
        attrs.push(Attr::ThreePoint);
    }
    let twos_made = line.fgm.saturating_sub(line.tpm);
    let twos_att = line.fga.saturating_sub(line.tpa);
    if twos_att >= 4 && twos_made * 5 < twos_att * 2 {
        attrs.push(Attr::InsideScoring);
    }
    if line.fta >= 2 && line.ftm * 2 < line.fta {
        attrs.push(Attr::FreeThrow);
    }
    if line.tov >= 3 {
        attrs.push(Attr::BallHandling);
    }
    if line.pf >= 5 {
        attrs.push(Attr::Composure);
    }
    if attrs.is_empty() {
        attrs.push(Attr::BasketballIq);
    }
    attrs
}

impl PlayerEvolutionEngine<'_> {
    /// Micro step for one player against one box-score line.
    pub fn apply_game_line(
        &self,
        player: &mut Player,
        line: &BoxLine,
        date: NaiveDate,
    ) -> Result<Vec<EvolutionEntry>, EvolutionError> {
        self.validate(player)?;
        let cfg = self.config;
        let mut entries = clamp_to_bounds(player, cfg.attribute_floor, date);
        if line.minutes() < cfg.min_minutes {
            return Ok(entries);
        }
        let Some(perf) = per_minute_game_score(line) else {
            return Ok(entries);
        };

        player.recent_form.push_back(perf);
        while player.recent_form.len() > cfg.streak_window.max(1) {
            player.recent_form.pop_front();
        }

        // A baseline needs at least one full game behind it
        let baseline = match season_game_score_per_minute(&player.season) {
            Some(b) if player.season.minutes >= cfg.minutes_reference => b,
            _ => return Ok(entries),
        };
        let form: Vec<f32> = player.recent_form.iter().copied().collect();
        let Some((cause, nudge)) = classify(perf - baseline, &form, baseline, cfg) else {
            return Ok(entries);
        };

        let attrs = if nudge > 0.0 { credited_attributes(line) } else { faulted_attributes(line) };
        for attribute in attrs {
            let delta = apply_drift(player, attribute, nudge, cfg.attribute_floor);
            if delta != 0 {
                entries.push(EvolutionEntry {
                    player: player.id,
                    category: attribute.category(),
                    attribute,
                    delta,
                    cause,
                    date,
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
    use crate::models::Position;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    fn big_night() -> BoxLine {
        BoxLine {
            player: 1,
            seconds: 32.0 * 60.0,
            points: 31,
            fgm: 11,
            fga: 18,
            tpm: 4,
            tpa: 7,
            ftm: 5,
            fta: 6,
            ast: 6,
            dreb: 5,
            stl: 2,
            ..Default::default()
        }
    }

    fn veteran() -> Player {
        let mut p = uniform_player(1, "Vet", Position::SG, 70).with_potential(85);
        // 10 quiet games: ~0.3 game score per minute
        p.season = StatCounters {
            games: 10,
            minutes: 300.0,
            points: 120,
            fgm: 45,
            fga: 100,
            tpm: 10,
            tpa: 30,
            ftm: 20,
            fta: 25,
            assists: 30,
            defensive_rebounds: 30,
            turnovers: 20,
            fouls: 20,
            ..Default::default()
        };
        p
    }

    #[test]
    fn test_game_score_formula() {
        let line = big_night();
        // 31 + 4.4 - 12.6 - 0.4 + 0 + 1.5 + 2 + 4.2 + 0 - 0 - 0
        assert!((game_score(&line) - 30.1).abs() < 1e-3, "{}", game_score(&line));
        assert_eq!(per_minute_game_score(&BoxLine::default()), None);
    }

    #[test]
    fn test_big_game_nudges_up() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut p = veteran();
        engine.apply_game_line(&mut p, &big_night(), date()).unwrap();

        let progress = p.evolution_progress[&Attr::ThreePoint];
        assert!(progress > 0.0 && progress <= cfg.nudge_max);
        assert!(p.evolution_progress.contains_key(&Attr::Passing));
        assert_eq!(p.recent_form.len(), 1);
    }

    #[test]
    fn test_short_stint_ignored() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut p = veteran();
        let line = BoxLine { seconds: 120.0, points: 6, fgm: 2, fga: 2, tpm: 2, tpa: 2, ..Default::default() };
        assert!(engine.apply_game_line(&mut p, &line, date()).unwrap().is_empty());
        assert!(p.recent_form.is_empty());
        assert!(p.evolution_progress.is_empty());
    }

    #[test]
    fn test_lowered_potential_clamps_even_on_a_quiet_night() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut p = veteran().with_potential(65);
        let line = BoxLine { seconds: 120.0, ..Default::default() };

        let entries = engine.apply_game_line(&mut p, &line, date()).unwrap();
        assert_eq!(entries.len(), Attr::ALL.len());
        assert!(entries.iter().all(|e| e.delta == -5 && e.cause == EvolutionCause::BoundsCorrection));
        assert!(p.attributes.iter().all(|(_, r)| r == 65));
    }

    #[test]
    fn test_rookie_without_baseline_only_records_form() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut p = uniform_player(1, "Rookie", Position::PG, 60);
        assert!(engine.apply_game_line(&mut p, &big_night(), date()).unwrap().is_empty());
        assert_eq!(p.recent_form.len(), 1);
        assert!(p.evolution_progress.is_empty());
    }

    #[test]
    fn test_streak_classification() {
        let cfg = EvolutionConfig::default();
        let hot = [0.6; 5];
        let (cause, nudge) = classify(0.3, &hot, 0.3, &cfg).unwrap();
        assert_eq!(cause, EvolutionCause::HotStreak);
        assert!((nudge - cfg.nudge_max * cfg.streak_multiplier).abs() < 1e-5);

        let mixed = [0.6, 0.1, 0.6, 0.6, 0.6];
        assert_eq!(classify(0.3, &mixed, 0.3, &cfg).unwrap().0, EvolutionCause::Overperformance);

        let cold = [0.1; 5];
        let (cause, nudge) = classify(-0.2, &cold, 0.3, &cfg).unwrap();
        assert_eq!(cause, EvolutionCause::ColdStreak);
        assert!(nudge < 0.0);

        assert!(classify(0.01, &hot, 0.3, &cfg).is_none());
    }

    #[test]
    fn test_window_is_bounded() {
        let cfg = EvolutionConfig::default();
        let engine = PlayerEvolutionEngine::new(&cfg);
        let mut p = veteran();
        for _ in 0..12 {
            engine.apply_game_line(&mut p, &big_night(), date()).unwrap();
        }
        assert_eq!(p.recent_form.len(), cfg.streak_window);
        assert!(p.rating(Attr::ThreePoint) > 70);
        assert!(p.rating(Attr::ThreePoint) <= 85);
    }
}
