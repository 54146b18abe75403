//! Box-score aggregation and the season ledger.
//!
//! [`StatAggregator`] is a deterministic fold of possession outcomes into a
//! [`BoxScore`]. Folding the play-by-play log of a finished game again from an
//! empty box yields the same box score the simulator sealed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::models::{
    BoxLine, BoxScore, GameResult, Player, PossessionOutcome, StatCounters, StatDelta, Team,
    TeamBox, TeamSide, TeamTotals,
};

pub struct StatAggregator;

impl StatAggregator {
    /// One zeroed line per roster player, starters flagged.
    pub fn empty_box(home: &Team, away: &Team) -> BoxScore {
        BoxScore { home: Self::empty_team_box(home), away: Self::empty_team_box(away) }
    }

    fn empty_team_box(team: &Team) -> TeamBox {
        let starters = team.starting_lineup.ids();
        TeamBox {
            team: team.id,
            lines: team
                .roster
                .iter()
                .map(|p| BoxLine::new(p.id, p.name.clone(), starters.contains(&p.id)))
                .collect(),
            totals: TeamTotals::default(),
        }
    }

    /// `apply(outcome, box) -> box'`
    pub fn apply(outcome: &PossessionOutcome, mut box_score: BoxScore) -> BoxScore {
        Self::apply_in_place(&mut box_score, outcome);
        box_score
    }

    pub fn apply_in_place(box_score: &mut BoxScore, outcome: &PossessionOutcome) {
        for delta in &outcome.deltas {
            let Some(side) = delta.side.or_else(|| Self::side_of(box_score, delta)) else {
                continue;
            };
            let team = box_score.side_mut(side);
            add_delta_to_line(team.line_mut(delta.player), delta);
            add_delta_to_totals(&mut team.totals, delta);
        }

        let home_pts = outcome.points_for(TeamSide::Home) as i32;
        let away_pts = outcome.points_for(TeamSide::Away) as i32;
        for side in [TeamSide::Home, TeamSide::Away] {
            let margin = match side {
                TeamSide::Home => home_pts - away_pts,
                TeamSide::Away => away_pts - home_pts,
            };
            let team = box_score.side_mut(side);
            for id in outcome.on_court(side) {
                let line = team.line_mut(*id);
                line.seconds += outcome.elapsed_secs;
                line.plus_minus += margin;
            }
        }
        box_score.side_mut(outcome.offense).totals.possessions += 1;
    }

    /// Fills shooting percentages. No attempts leaves `None`.
    pub fn finalize(mut box_score: BoxScore) -> BoxScore {
        for team in [&mut box_score.home, &mut box_score.away] {
            for line in team.lines.iter_mut() {
                line.fg_pct = pct(line.fgm, line.fga);
                line.tp_pct = pct(line.tpm, line.tpa);
                line.ft_pct = pct(line.ftm, line.fta);
            }
            let t = &mut team.totals;
            t.fg_pct = pct(t.fgm, t.fga);
            t.tp_pct = pct(t.tpm, t.tpa);
            t.ft_pct = pct(t.ftm, t.fta);
        }
        box_score
    }

    /// Rebuilds a finalised box score from an outcome log.
    pub fn replay<'a>(
        empty: BoxScore,
        log: impl IntoIterator<Item = &'a PossessionOutcome>,
    ) -> BoxScore {
        let folded = log.into_iter().fold(empty, |acc, outcome| Self::apply(outcome, acc));
        Self::finalize(folded)
    }

    fn side_of(box_score: &BoxScore, delta: &StatDelta) -> Option<TeamSide> {
        if box_score.home.line(delta.player).is_some() {
            Some(TeamSide::Home)
        } else if box_score.away.line(delta.player).is_some() {
            Some(TeamSide::Away)
        } else {
            None
        }
    }
}

fn pct(made: u16, attempted: u16) -> Option<f32> {
    (attempted > 0).then(|| made as f32 / attempted as f32)
}

fn add_delta_to_line(line: &mut BoxLine, d: &StatDelta) {
    line.points += d.points;
    line.fgm += d.fgm;
    line.fga += d.fga;
    line.tpm += d.tpm;
    line.tpa += d.tpa;
    line.ftm += d.ftm;
    line.fta += d.fta;
    line.oreb += d.oreb;
    line.dreb += d.dreb;
    line.ast += d.ast;
    line.stl += d.stl;
    line.blk += d.blk;
    line.tov += d.tov;
    line.pf += d.pf;
}

fn add_delta_to_totals(t: &mut TeamTotals, d: &StatDelta) {
    t.points += d.points;
    t.fgm += d.fgm;
    t.fga += d.fga;
    t.tpm += d.tpm;
    t.tpa += d.tpa;
    t.ftm += d.ftm;
    t.fta += d.fta;
    t.oreb += d.oreb;
    t.dreb += d.dreb;
    t.ast += d.ast;
    t.stl += d.stl;
    t.blk += d.blk;
    t.tov += d.tov;
    t.pf += d.pf;
}

// =============================================================================
// Season ledger
// =============================================================================

/// Applies finished games to season and career counters exactly once per
/// game id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonLedger {
    applied: BTreeSet<u64>,
}

impl SeasonLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_applied(&self, game_id: u64) -> bool {
        self.applied.contains(&game_id)
    }

    pub fn games_applied(&self) -> usize {
        self.applied.len()
    }

    /// Folds `result` into `players` (the two rosters that played).
    ///
    /// Injuries sustained in the game are copied onto the player; injuries
    /// carried into the game tick down by one. Returns `false` and changes
    /// nothing if the game id was already applied.
    pub fn apply_game(&mut self, result: &GameResult, players: &mut [Player]) -> bool {
        if !self.applied.insert(result.game_id) {
            debug!(game_id = result.game_id, "game already applied to ledger");
            return false;
        }

        for player in players.iter_mut() {
            if let Some(line) = result.box_score.line(player.id) {
                if line.played() {
                    add_line(&mut player.season, line);
                    add_line(&mut player.career, line);
                }
            }

            match result.injuries.iter().find(|r| r.player == player.id) {
                Some(report) => player.injury = Some(report.injury),
                None => {
                    if let Some(injury) = player.injury.as_mut() {
                        injury.games_remaining = injury.games_remaining.saturating_sub(1);
                        if injury.games_remaining == 0 {
                            player.injury = None;
                        }
                    }
                }
            }
        }
        true
    }
}

fn add_line(c: &mut StatCounters, line: &BoxLine) {
    c.games += 1;
    c.minutes += line.minutes();
    c.points += line.points as u32;
    c.offensive_rebounds += line.oreb as u32;
    c.defensive_rebounds += line.dreb as u32;
    c.assists += line.ast as u32;
    c.steals += line.stl as u32;
    c.blocks += line.blk as u32;
    c.turnovers += line.tov as u32;
    c.fouls += line.pf as u32;
    c.fgm += line.fgm as u32;
    c.fga += line.fga as u32;
    c.tpm += line.tpm as u32;
    c.tpa += line.tpa as u32;
    c.ftm += line.ftm as u32;
    c.fta += line.fta as u32;
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::game_sim::GameSimulator;
    use crate::engine::test_fixtures::uniform_team;
    use crate::models::{
        ActionType, Injury, InjurySeverity, InjuryType, PossessionResult, ShotKind,
    };

    fn made_three(home: &Team, away: &Team) -> PossessionOutcome {
        let shooter = home.roster[1].id;
        let passer = home.roster[0].id;
        let mut shot = StatDelta::new(shooter, TeamSide::Home);
        shot.points = 3;
        shot.fgm = 1;
        shot.fga = 1;
        shot.tpm = 1;
        shot.tpa = 1;
        let mut assist = StatDelta::new(passer, TeamSide::Home);
        assist.ast = 1;
        PossessionOutcome {
            offense: TeamSide::Home,
            ball_handler: passer,
            action: ActionType::Pass,
            result: PossessionResult::FieldGoal {
                shooter,
                shot: ShotKind::Three,
                assisted_by: Some(passer),
                and_one: false,
            },
            elapsed_secs: 14.0,
            points: 3,
            deltas: vec![shot, assist],
            plays: Vec::new(),
            on_court_home: home.starting_lineup.ids(),
            on_court_away: away.starting_lineup.ids(),
            description: "three".to_string(),
        }
    }

    #[test]
    fn test_apply_routes_deltas() {
        let home = uniform_team(1, "Home", 75);
        let away = uniform_team(2, "Away", 75);
        let empty = StatAggregator::empty_box(&home, &away);
        assert_eq!(empty.home.lines.len(), 10);
        assert!(empty.home.lines[0].starter && !empty.home.lines[5].starter);

        let outcome = made_three(&home, &away);
        let box_score = StatAggregator::finalize(StatAggregator::apply(&outcome, empty));

        let line = box_score.line(102).unwrap();
        assert_eq!((line.points, line.tpm, line.plus_minus), (3, 1, 3));
        assert_eq!(line.tp_pct, Some(1.0));
        assert_eq!(line.ft_pct, None);
        assert_eq!(box_score.line(101).unwrap().ast, 1);
        assert_eq!(box_score.line(201).unwrap().plus_minus, -3);
        assert_eq!(box_score.line(201).unwrap().seconds, 14.0);
        assert!(!box_score.line(106).unwrap().played());
        assert_eq!(box_score.home.totals.points, 3);
        assert_eq!(box_score.home.totals.possessions, 1);
        assert_eq!(box_score.away.totals.possessions, 0);
    }

    #[test]
    fn test_replay_reproduces_box_score() {
        let home = uniform_team(1, "Home", 77);
        let away = uniform_team(2, "Away", 73);
        let result = GameSimulator::with_defaults(9, &home, &away, 2024).unwrap().run().unwrap();

        let replayed = StatAggregator::replay(
            StatAggregator::empty_box(&home, &away),
            result.play_by_play.iter().map(|s| &s.outcome),
        );
        assert_eq!(replayed, result.box_score);
    }

    #[test]
    fn test_ledger_applies_once() {
        let home = uniform_team(1, "Home", 75);
        let away = uniform_team(2, "Away", 75);
        let result = GameSimulator::with_defaults(3, &home, &away, 8).unwrap().run().unwrap();

        let mut players: Vec<Player> =
            home.roster.iter().chain(away.roster.iter()).cloned().collect();
        let mut ledger = SeasonLedger::new();
        assert!(ledger.apply_game(&result, &mut players));
        let after_first: Vec<StatCounters> = players.iter().map(|p| p.season.clone()).collect();
        assert!(!ledger.apply_game(&result, &mut players));
        let after_second: Vec<StatCounters> = players.iter().map(|p| p.season.clone()).collect();

        assert_eq!(after_first, after_second);
        assert!(ledger.is_applied(3));
        let points: u32 = players[..10].iter().map(|p| p.season.points).sum();
        assert_eq!(points, result.home_score as u32);
        assert_eq!(players[0].career.games, 1);
    }

    #[test]
    fn test_ledger_ticks_existing_injuries() {
        let home = uniform_team(1, "Home", 75);
        let away = uniform_team(2, "Away", 75);
        let result = GameSimulator::new(
            4,
            &home,
            &away,
            8,
            crate::engine::config::SimConfig::injury_free(),
            crate::badges::BadgeCatalog::builtin(),
        )
        .unwrap()
        .run()
        .unwrap();

        let mut players = home.roster.clone();
        players[9].injury = Some(Injury {
            kind: InjuryType::AnkleSprain,
            severity: InjurySeverity::Minor,
            games_remaining: 1,
        });
        SeasonLedger::new().apply_game(&result, &mut players);
        assert!(players[9].injury.is_none());
    }
}
