//! Test Fixtures Module
//!
//! Shared roster builders for unit tests, integration tests and benches.
//!
//! ## Usage
//! ```rust
//! use hoops_core::engine::test_fixtures::uniform_team;
//!
//! let team = uniform_team(1, "Fixture", 75);
//! assert!(team.validate().is_ok());
//! ```

use std::sync::Arc;

use crate::batch::GameSpec;
use crate::models::{
    Attributes, BadgeLevel, Player, PlayerId, Position, StartingLineup, Team, TeamId, ON_COURT,
};

// =============================================================================
// Player / Team Creation Helpers
// =============================================================================

/// Player with every attribute at `rating`.
pub fn uniform_player(id: PlayerId, name: &str, position: Position, rating: u8) -> Player {
    Player::new(id, name, position)
        .with_attributes(Attributes::uniform(rating))
        .with_potential(rating.saturating_add(10).min(99))
}

/// Ten-man roster: starters PG..C, then a bench PG..C. Player ids are
/// `team_id * 100 + 1..=10`.
pub fn uniform_team(id: TeamId, name: &str, rating: u8) -> Team {
    let mut roster = Vec::with_capacity(2 * ON_COURT);
    for unit in 0..2u32 {
        for (slot, position) in Position::ALL.iter().enumerate() {
            let pid = id * 100 + unit * ON_COURT as u32 + slot as u32 + 1;
            let label = if unit == 0 { "Starter" } else { "Bench" };
            roster.push(uniform_player(pid, &format!("{name} {label} {position:?}"), *position, rating));
        }
    }

    let starting_lineup = StartingLineup {
        pg: id * 100 + 1,
        sg: id * 100 + 2,
        sf: id * 100 + 3,
        pf: id * 100 + 4,
        c: id * 100 + 5,
    };

    Team {
        id,
        name: name.to_string(),
        roster,
        starting_lineup,
        scheme: Default::default(),
        modifiers: Default::default(),
    }
}

/// Team whose starting guards carry the gold splash-connection pair.
pub fn splash_team(id: TeamId, name: &str, rating: u8) -> Team {
    let mut team = uniform_team(id, name, rating);
    team.roster[0] = team.roster[0].clone().with_badge("floor_general", BadgeLevel::Gold);
    team.roster[1] = team.roster[1].clone().with_badge("deadeye", BadgeLevel::Gold);
    team
}

/// Team that fails validation: only three players.
pub fn short_handed_team(id: TeamId, name: &str) -> Team {
    let mut team = uniform_team(id, name, 70);
    team.roster.truncate(3);
    team
}

/// First five roster entries in slot order.
pub fn court_players(players: &[Player]) -> [&Player; ON_COURT] {
    std::array::from_fn(|i| &players[i])
}

/// `n` teams with ids 1..=n at a uniform rating.
pub fn league(n: u32, rating: u8) -> Vec<Arc<Team>> {
    (1..=n).map(|id| Arc::new(uniform_team(id, &format!("Team {id}"), rating))).collect()
}

/// Every pairing once, home team first. Game ids count from 1.
pub fn round_robin(teams: &[Arc<Team>]) -> Vec<GameSpec> {
    let mut games = Vec::new();
    let mut game_id = 1;
    for (i, home) in teams.iter().enumerate() {
        for away in teams.iter().skip(i + 1) {
            games.push(GameSpec::new(game_id, Arc::clone(home), Arc::clone(away)));
            game_id += 1;
        }
    }
    games
}
