use super::player::{Attr, Player, PlayerId, Position, MAX_RATING};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type TeamId = u32;

/// Players on the floor per side.
pub const ON_COURT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub roster: Vec<Player>,
    pub starting_lineup: StartingLineup,
    #[serde(default)]
    pub scheme: CoachingScheme,
    #[serde(default)]
    pub modifiers: TeamModifiers,
}

/// Roster ids in PG/SG/SF/PF/C slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingLineup {
    pub pg: PlayerId,
    pub sg: PlayerId,
    pub sf: PlayerId,
    pub pf: PlayerId,
    pub c: PlayerId,
}

impl StartingLineup {
    pub fn ids(&self) -> [PlayerId; ON_COURT] {
        [self.pg, self.sg, self.sf, self.pf, self.c]
    }

    pub fn slot(&self, position: Position) -> PlayerId {
        self.ids()[position.slot()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffenseStyle {
    Balanced,
    PaceAndSpace,
    PostCentric,
    IsoHeavy,
}

impl OffenseStyle {
    /// Multiplier on possession length. Below 1.0 means faster possessions.
    pub fn pace_factor(&self) -> f32 {
        match self {
            OffenseStyle::Balanced => 1.0,
            OffenseStyle::PaceAndSpace => 0.88,
            OffenseStyle::PostCentric => 1.1,
            OffenseStyle::IsoHeavy => 1.22,
        }
    }

    /// Action weight bias in (drive, spot_up, post_up, pass) order.
    pub fn action_bias(&self) -> [f32; 4] {
        match self {
            OffenseStyle::Balanced => [1.0, 1.0, 1.0, 1.0],
            OffenseStyle::PaceAndSpace => [1.0, 1.4, 0.6, 1.1],
            OffenseStyle::PostCentric => [0.9, 0.8, 1.7, 1.0],
            OffenseStyle::IsoHeavy => [1.5, 0.9, 1.0, 0.6],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseStyle {
    ManToMan,
    Zone,
    SwitchEverything,
    AggressivePress,
}

impl DefenseStyle {
    /// Multiplier on the offense's (drive, spot_up, post_up, pass) weights.
    pub fn action_bias(&self) -> [f32; 4] {
        match self {
            DefenseStyle::ManToMan => [1.0, 1.0, 1.0, 1.0],
            // Zones pack the paint and give up jumpers
            DefenseStyle::Zone => [0.75, 1.3, 0.8, 1.1],
            DefenseStyle::SwitchEverything => [0.9, 1.0, 1.25, 0.9],
            DefenseStyle::AggressivePress => [1.1, 1.0, 1.0, 1.1],
        }
    }

    /// Multiplier on turnover and foul rates.
    pub fn pressure(&self) -> f32 {
        match self {
            DefenseStyle::ManToMan => 1.0,
            DefenseStyle::Zone => 0.85,
            DefenseStyle::SwitchEverything => 1.0,
            DefenseStyle::AggressivePress => 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingScheme {
    pub offense: OffenseStyle,
    pub defense: DefenseStyle,
}

impl Default for CoachingScheme {
    fn default() -> Self {
        Self { offense: OffenseStyle::Balanced, defense: DefenseStyle::ManToMan }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamModifiers {
    /// 0.0-1.0, nudges pass and assist rates.
    pub chemistry: f32,
    /// 0.0-1.0, fraction of on-court fatigue gain ignored.
    pub fatigue_resistance: f32,
}

impl Default for TeamModifiers {
    fn default() -> Self {
        Self { chemistry: 0.5, fatigue_resistance: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(&self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            TeamSide::Home => 0,
            TeamSide::Away => 1,
        }
    }
}

impl Team {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.roster.iter_mut().find(|p| p.id == id)
    }

    pub fn available_players(&self) -> impl Iterator<Item = &Player> {
        self.roster.iter().filter(|p| p.is_available())
    }

    /// Roster checks run before tip-off. Any failure here fails the whole game.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.roster.is_empty() {
            return Err(GameError::EmptyRoster { team: self.id });
        }

        let mut seen = HashSet::with_capacity(self.roster.len());
        for player in &self.roster {
            if !seen.insert(player.id) {
                return Err(GameError::DuplicatePlayer { team: self.id, player: player.id });
            }
            self.validate_ratings(player)?;
        }

        let available = self.available_players().count();
        if available < ON_COURT {
            return Err(GameError::NotEnoughPlayers {
                team: self.id,
                available,
                required: ON_COURT,
            });
        }

        let mut lineup_seen = HashSet::with_capacity(ON_COURT);
        for id in self.starting_lineup.ids() {
            if !lineup_seen.insert(id) {
                return Err(GameError::DuplicatePlayer { team: self.id, player: id });
            }
            match self.player(id) {
                Some(p) if p.is_available() => {}
                _ => return Err(GameError::InvalidLineup { team: self.id, player: id }),
            }
        }

        Ok(())
    }

    /// Every canonical attribute must be present and within the rating cap.
    fn validate_ratings(&self, player: &Player) -> Result<(), GameError> {
        for attr in Attr::ALL {
            match player.attributes.get(attr) {
                None => {
                    return Err(GameError::MissingRating { team: self.id, player: player.id, attr })
                }
                Some(value) if value > MAX_RATING => {
                    return Err(GameError::RatingOutOfRange {
                        team: self.id,
                        player: player.id,
                        attr,
                        value,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
