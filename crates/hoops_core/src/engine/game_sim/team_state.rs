//! Per-team mutable state for one game.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::badges::ActiveEffects;
use crate::engine::possession::CourtSide;
use crate::error::GameError;
use crate::models::{
    CoachingScheme, Player, PlayerId, Team, TeamId, TeamModifiers, TeamSide, ON_COURT,
};

#[derive(Debug, Clone)]
pub(crate) struct TeamState {
    pub team_id: TeamId,
    pub side: TeamSide,
    pub scheme: CoachingScheme,
    pub modifiers: TeamModifiers,
    /// Working copies in roster order; fatigue and injuries change during the game.
    pub players: Vec<Player>,
    /// Roster index per lineup slot.
    pub on_court: [usize; ON_COURT],
    pub starters: [usize; ON_COURT],
    pub fouls: Vec<u8>,
    pub fouled_out: Vec<bool>,
    pub injured_in_game: Vec<bool>,
    pub team_fouls: u8,
    pub timeouts_left: u8,
    /// Synergy ids active for the current five.
    pub active_synergies: BTreeSet<String>,
}

impl TeamState {
    pub fn new(team: &Team, side: TeamSide, timeouts: u8) -> Result<Self, GameError> {
        let players = team.roster.clone();
        let mut on_court = [0usize; ON_COURT];
        for (slot, id) in team.starting_lineup.ids().iter().enumerate() {
            on_court[slot] = players
                .iter()
                .position(|p| p.id == *id)
                .ok_or(GameError::InvalidLineup { team: team.id, player: *id })?;
        }
        let n = players.len();
        Ok(Self {
            team_id: team.id,
            side,
            scheme: team.scheme,
            modifiers: team.modifiers,
            players,
            on_court,
            starters: on_court,
            fouls: vec![0; n],
            fouled_out: vec![false; n],
            injured_in_game: vec![false; n],
            team_fouls: 0,
            timeouts_left: timeouts,
            active_synergies: BTreeSet::new(),
        })
    }

    pub fn is_on_court(&self, idx: usize) -> bool {
        self.on_court.contains(&idx)
    }

    /// Can check in: healthy, not disqualified, currently on the bench.
    pub fn is_eligible(&self, idx: usize) -> bool {
        !self.is_on_court(idx)
            && !self.fouled_out[idx]
            && !self.injured_in_game[idx]
            && self.players[idx].is_available()
    }

    pub fn bench(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.players.len()).filter(move |idx| self.is_eligible(*idx))
    }

    pub fn on_court_ids(&self) -> [PlayerId; ON_COURT] {
        self.on_court.map(|idx| self.players[idx].id)
    }

    pub fn court_players(&self) -> [&Player; ON_COURT] {
        self.on_court.map(|idx| &self.players[idx])
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn court_side<'a>(&'a self, effects: &'a Arc<ActiveEffects>) -> CourtSide<'a> {
        CourtSide {
            side: self.side,
            players: self.court_players(),
            effects: effects.as_ref(),
            scheme: self.scheme,
            personal_fouls: self.on_court.map(|idx| self.fouls[idx]),
            team_fouls: self.team_fouls,
            chemistry: self.modifiers.chemistry,
        }
    }
}
