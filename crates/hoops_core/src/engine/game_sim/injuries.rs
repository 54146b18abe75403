//! Per-possession injury rolls.

use rand::Rng;
use tracing::debug;

use super::GameSimulator;
use crate::engine::probability::{injury_probability, roll, weighted_index};
use crate::error::Result;
use crate::models::{
    GameEventKind, Injury, InjuryReport, InjurySeverity, InjuryType, SubstitutionReason, TeamSide,
    ON_COURT,
};

impl GameSimulator {
    /// Rolls every on-court player. An injured player leaves for the rest of
    /// the game; no eligible replacement fails the game.
    pub(super) fn roll_injuries(&mut self) -> Result<()> {
        for side in [TeamSide::Home, TeamSide::Away] {
            for slot in 0..ON_COURT {
                let idx = self.teams[side.index()].on_court[slot];
                let player = &self.teams[side.index()].players[idx];
                let p = injury_probability(player.injury_risk, player.fatigue, &self.config.injury);
                if !roll(p, &mut self.rng) {
                    continue;
                }

                let injury = self.draw_injury();
                let team = &mut self.teams[side.index()];
                team.injured_in_game[idx] = true;
                team.players[idx].injury = Some(injury);
                let player_id = team.players[idx].id;
                let team_id = team.team_id;

                debug!(
                    game_id = self.game_id,
                    player = player_id,
                    severity = ?injury.severity,
                    games = injury.games_remaining,
                    "injury"
                );
                self.injuries.push(InjuryReport {
                    player: player_id,
                    team: team_id,
                    period: self.period,
                    injury,
                });
                self.emit(GameEventKind::Injury { side, player: player_id, injury });
                self.force_substitution(side, slot, SubstitutionReason::Injury)?;
            }
        }
        Ok(())
    }

    fn draw_injury(&mut self) -> Injury {
        let cfg = &self.config.injury;
        let severity = InjurySeverity::ALL[weighted_index(&cfg.severity_weights, &mut self.rng)];
        let (lo, hi) = cfg.games_out(severity);
        let games_remaining = self.rng.gen_range(lo.min(hi)..=hi.max(lo));
        let kind = InjuryType::ALL[self.rng.gen_range(0..InjuryType::ALL.len())];
        Injury { kind, severity, games_remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::BadgeCatalog;
    use crate::engine::config::SimConfig;
    use crate::engine::test_fixtures::uniform_team;
    use crate::error::GameError;
    use crate::models::InjuryRisk;

    fn injury_prone_config() -> SimConfig {
        let mut cfg = SimConfig::default();
        cfg.injury.base_rate = 0.05;
        cfg
    }

    #[test]
    fn test_injured_player_leaves_and_is_reported() {
        let home = uniform_team(1, "Home", 75);
        let away = uniform_team(2, "Away", 75);
        let mut sim =
            GameSimulator::new(1, &home, &away, 77, injury_prone_config(), BadgeCatalog::builtin())
                .unwrap();

        for _ in 0..40 {
            if !sim.injuries.is_empty() {
                break;
            }
            sim.roll_injuries().unwrap();
        }
        let report = sim.injuries.first().cloned().unwrap();
        let team = &sim.teams[if report.team == 1 { 0 } else { 1 }];
        let idx = team.index_of(report.player).unwrap();
        assert!(team.injured_in_game[idx]);
        assert!(!team.is_on_court(idx));
        assert!(report.injury.games_remaining >= 1);
    }

    #[test]
    fn test_short_bench_exhausts_roster() {
        let mut home = uniform_team(1, "Home", 75);
        home.roster.truncate(5);
        for p in home.roster.iter_mut() {
            p.injury_risk = InjuryRisk::High;
        }
        let away = uniform_team(2, "Away", 75);
        let mut cfg = injury_prone_config();
        cfg.injury.base_rate = 0.5;
        let mut sim = GameSimulator::new(1, &home, &away, 5, cfg, BadgeCatalog::builtin()).unwrap();

        let mut result = Ok(());
        for _ in 0..20 {
            result = sim.roll_injuries();
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(GameError::RosterExhausted { .. })));
    }

    #[test]
    fn test_severity_ranges_respected() {
        let home = uniform_team(1, "Home", 75);
        let away = uniform_team(2, "Away", 75);
        let mut sim = GameSimulator::with_defaults(1, &home, &away, 3).unwrap();
        for _ in 0..200 {
            let injury = sim.draw_injury();
            let (lo, hi) = sim.config.injury.games_out(injury.severity);
            assert!((lo..=hi).contains(&injury.games_remaining));
        }
    }
}
