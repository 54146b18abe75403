//! Rotation logic: fatigue, foul trouble, forced exits and starters returning.

use tracing::debug;

use super::GameSimulator;
use crate::error::{GameError, Result};
use crate::models::{GameEventKind, Position, SubstitutionReason, TeamSide, MAX_FATIGUE, ON_COURT};

impl GameSimulator {
    /// Voluntary substitutions for both benches. A tired or foul-troubled
    /// player stays on when nobody suitable is available.
    pub(super) fn process_substitutions(&mut self) {
        let trouble = self.config.possession.foul_trouble_limit(self.period);
        let sub_out = self.config.fatigue.sub_out_threshold;

        for side in [TeamSide::Home, TeamSide::Away] {
            for slot in 0..ON_COURT {
                let team = self.team(side);
                let idx = team.on_court[slot];
                let reason = if team.fouls[idx] >= trouble {
                    SubstitutionReason::FoulTrouble
                } else if team.players[idx].fatigue > sub_out {
                    SubstitutionReason::Fatigue
                } else {
                    continue;
                };
                if let Some(bench_idx) = self.find_substitution_candidate(side, slot) {
                    self.execute_substitution(side, slot, bench_idx, reason);
                }
            }
            self.return_starters(side);
        }
    }

    /// Replaces the player in `slot` who can no longer play.
    pub(super) fn force_substitution(
        &mut self,
        side: TeamSide,
        slot: usize,
        reason: SubstitutionReason,
    ) -> Result<()> {
        let bench_idx = self
            .find_substitution_candidate(side, slot)
            .or_else(|| self.any_eligible(side))
            .ok_or(GameError::RosterExhausted { team: self.team(side).team_id })?;
        self.execute_substitution(side, slot, bench_idx, reason);
        Ok(())
    }

    /// Best rested bench player for `slot`: natural fits at the slot's
    /// position first, then anyone. Score is overall scaled by freshness.
    fn find_substitution_candidate(&self, side: TeamSide, slot: usize) -> Option<usize> {
        let team = self.team(side);
        let position = Position::ALL[slot];
        let trouble = self.config.possession.foul_trouble_limit(self.period);
        let fresh = self.config.fatigue.return_threshold;
        let usable = self.config.fatigue.sub_out_threshold;

        let score = |idx: usize| {
            let p = &team.players[idx];
            p.overall() * (1.0 - p.fatigue / MAX_FATIGUE)
        };
        let pick = |max_fatigue: f32, same_position: bool| {
            team.bench()
                .filter(|&idx| team.fouls[idx] < trouble)
                .filter(|&idx| team.players[idx].fatigue < max_fatigue)
                .filter(|&idx| !same_position || team.players[idx].can_play(position))
                .max_by(|&a, &b| score(a).total_cmp(&score(b)).then(b.cmp(&a)))
        };

        pick(fresh, true)
            .or_else(|| pick(fresh, false))
            .or_else(|| pick(usable, true))
            .or_else(|| pick(usable, false))
    }

    /// Anyone who can still check in, regardless of fatigue or fouls.
    fn any_eligible(&self, side: TeamSide) -> Option<usize> {
        let team = self.team(side);
        team.bench().min_by(|&a, &b| team.players[a].fatigue.total_cmp(&team.players[b].fatigue))
    }

    /// Rested starters take their slot back from a reserve.
    fn return_starters(&mut self, side: TeamSide) {
        let trouble = self.config.possession.foul_trouble_limit(self.period);
        let fresh = self.config.fatigue.return_threshold;

        for slot in 0..ON_COURT {
            let team = self.team(side);
            let starter = team.starters[slot];
            let occupant = team.on_court[slot];
            if occupant == starter || team.starters.contains(&occupant) {
                continue;
            }
            let ready = team.is_eligible(starter)
                && team.fouls[starter] < trouble
                && team.players[starter].fatigue < fresh;
            if ready {
                self.execute_substitution(side, slot, starter, SubstitutionReason::Recovered);
            }
        }
    }

    fn execute_substitution(
        &mut self,
        side: TeamSide,
        slot: usize,
        bench_idx: usize,
        reason: SubstitutionReason,
    ) {
        let team = self.team_mut(side);
        let old_lineup = team.on_court_ids();
        let out_idx = team.on_court[slot];
        team.on_court[slot] = bench_idx;
        let player_out = team.players[out_idx].id;
        let player_in = team.players[bench_idx].id;

        self.caches[side.index()].invalidate(&old_lineup);
        debug!(
            game_id = self.game_id,
            side = ?side,
            out = player_out,
            r#in = player_in,
            reason = ?reason,
            "substitution"
        );
        self.emit(GameEventKind::Substitution { side, player_out, player_in, reason });
        self.refresh_synergies(side);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::uniform_team;

    fn sim() -> GameSimulator {
        let home = uniform_team(1, "Home", 75);
        let away = uniform_team(2, "Away", 75);
        GameSimulator::with_defaults(1, &home, &away, 0).unwrap()
    }

    fn subs(sim: &GameSimulator) -> Vec<(u32, u32, SubstitutionReason)> {
        sim.events
            .iter()
            .filter_map(|e| match e.kind {
                GameEventKind::Substitution { player_out, player_in, reason, .. } => {
                    Some((player_out, player_in, reason))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tired_player_replaced_by_same_position() {
        let mut sim = sim();
        sim.teams[0].players[0].set_fatigue(85.0);
        sim.process_substitutions();

        // Roster order: five starters, then a backup per position
        assert_eq!(sim.teams[0].on_court[0], 5);
        assert_eq!(subs(&sim), vec![(101, 106, SubstitutionReason::Fatigue)]);
    }

    #[test]
    fn test_tired_player_stays_without_rested_bench() {
        let mut sim = sim();
        for p in sim.teams[0].players.iter_mut() {
            p.set_fatigue(90.0);
        }
        sim.process_substitutions();
        assert_eq!(sim.teams[0].on_court, sim.teams[0].starters);
        assert!(subs(&sim).is_empty());
    }

    #[test]
    fn test_foul_trouble_benches_player() {
        let mut sim = sim();
        sim.teams[1].fouls[2] = 2;
        sim.process_substitutions();
        assert!(!sim.teams[1].is_on_court(2));
        assert_eq!(subs(&sim), vec![(203, 208, SubstitutionReason::FoulTrouble)]);
    }

    #[test]
    fn test_rested_starter_returns() {
        let mut sim = sim();
        sim.teams[0].players[0].set_fatigue(85.0);
        sim.process_substitutions();
        assert_eq!(sim.teams[0].on_court[0], 5);

        sim.teams[0].players[0].set_fatigue(30.0);
        sim.process_substitutions();
        assert_eq!(sim.teams[0].on_court[0], 0);
        assert_eq!(subs(&sim).last(), Some(&(106, 101, SubstitutionReason::Recovered)));
    }

    #[test]
    fn test_forced_substitution_uses_tired_bench() {
        let mut sim = sim();
        for idx in 5..10 {
            sim.teams[0].players[idx].set_fatigue(95.0);
        }
        sim.teams[0].players[8].set_fatigue(92.0);
        sim.force_substitution(TeamSide::Home, 0, SubstitutionReason::Injury).unwrap();
        assert_eq!(sim.teams[0].on_court[0], 8);
    }

    #[test]
    fn test_forced_substitution_fails_on_empty_bench() {
        let mut sim = sim();
        for idx in 5..10 {
            sim.teams[0].fouled_out[idx] = true;
        }
        assert!(matches!(
            sim.force_substitution(TeamSide::Home, 3, SubstitutionReason::Injury),
            Err(GameError::RosterExhausted { team: 1 })
        ));
    }
}
