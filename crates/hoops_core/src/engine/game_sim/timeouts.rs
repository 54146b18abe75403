//! Foul bookkeeping and momentum timeouts.

use tracing::{debug, warn};

use super::GameSimulator;
use crate::models::{GameEventKind, PossessionOutcome, SubstitutionReason, TeamSide};

impl GameSimulator {
    /// Charges personal and team fouls and disqualifies players at the limit.
    pub(super) fn process_fouls(&mut self, outcome: &PossessionOutcome) {
        let limit = self.config.possession.foul_out_limit;

        for side in [TeamSide::Home, TeamSide::Away] {
            for (player, pf) in outcome.fouls_by(side) {
                let team = self.team_mut(side);
                let Some(idx) = team.index_of(player) else {
                    continue;
                };
                let added = u8::try_from(pf).unwrap_or(u8::MAX);
                team.fouls[idx] = team.fouls[idx].saturating_add(added);
                team.team_fouls = team.team_fouls.saturating_add(added);

                if team.fouls[idx] < limit || team.fouled_out[idx] {
                    continue;
                }
                team.fouled_out[idx] = true;
                let slot = team.on_court.iter().position(|&i| i == idx);

                debug!(game_id = self.game_id, player, "fouled out");
                self.emit(GameEventKind::FoulOut { side, player });
                // With nobody eligible on the bench the disqualified player
                // keeps the slot so the team still fields five.
                if let Some(slot) = slot {
                    if let Err(err) = self.force_substitution(side, slot, SubstitutionReason::FoulOut) {
                        warn!(game_id = self.game_id, player, error = %err, "fouled-out player stays on");
                    }
                }
            }
        }
    }

    /// Tracks the current unanswered run. When it reaches the trigger the
    /// trailing side calls timeout if it has one left.
    pub(super) fn track_run(&mut self, side: TeamSide, points: u16) {
        if points == 0 {
            return;
        }
        let run = match self.run {
            Some((s, p)) if s == side => p + points,
            _ => points,
        };
        self.run = Some((side, run));

        if run < self.config.clock.timeout_run_trigger {
            return;
        }
        let caller = side.opponent();
        let team = self.team_mut(caller);
        if team.timeouts_left == 0 {
            return;
        }
        team.timeouts_left -= 1;
        let remaining = team.timeouts_left;

        debug!(game_id = self.game_id, side = ?caller, run, remaining, "timeout");
        self.emit(GameEventKind::Timeout { side: caller, remaining });
        self.recover_on_court(self.config.fatigue.timeout_recovery);
        self.run = None;
    }
}
