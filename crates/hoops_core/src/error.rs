use thiserror::Error;

use crate::models::{Attr, PlayerId, TeamId};

/// Anomaly raised while resolving a single possession.
///
/// The game simulator never propagates these: the possession is replaced by a
/// neutral no-op outcome and the game keeps running.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PossessionError {
    #[error("player {player} is missing attribute {attr:?}")]
    MissingAttribute { player: PlayerId, attr: Attr },

    #[error("player {player} has out-of-range attribute {attr:?} = {value}")]
    InvalidAttribute { player: PlayerId, attr: Attr, value: u8 },

    #[error("non-finite probability while resolving {context}")]
    NonFiniteProbability { context: &'static str },
}

/// Failure that makes a single game impossible to simulate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("team {team} has an empty roster")]
    EmptyRoster { team: TeamId },

    #[error("team {team} has only {available} available players (need {required})")]
    NotEnoughPlayers { team: TeamId, available: usize, required: usize },

    #[error("team {team} lists player {player} more than once")]
    DuplicatePlayer { team: TeamId, player: PlayerId },

    #[error("team {team} starting lineup references unknown or unavailable player {player}")]
    InvalidLineup { team: TeamId, player: PlayerId },

    #[error("a team cannot play itself (team {team})")]
    SameTeam { team: TeamId },

    #[error("team {team} player {player} has no {attr:?} rating")]
    MissingRating { team: TeamId, player: PlayerId, attr: Attr },

    #[error("team {team} player {player} has {attr:?} = {value}, above the rating cap")]
    RatingOutOfRange { team: TeamId, player: PlayerId, attr: Attr, value: u8 },

    #[error("team {team} ran out of eligible players mid-game")]
    RosterExhausted { team: TeamId },

    #[error("game still tied after {overtime_periods} overtime periods")]
    OvertimeLimit { overtime_periods: u8 },

    #[error("simulation panicked: {message}")]
    Panicked { message: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl GameError {
    /// Whether re-running the same request can succeed.
    ///
    /// Roster problems are data errors and will fail identically on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::Panicked { .. })
    }
}

/// Batch-level failures, reported before any game is scheduled.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("batch contains no games")]
    EmptyBatch,

    #[error("game id {game_id} appears more than once in the batch")]
    DuplicateGameId { game_id: u64 },

    #[error("batches must be started from within a tokio runtime")]
    NoRuntime,

    #[error("batch driver task failed: {0}")]
    Driver(#[from] tokio::task::JoinError),
}

/// Per-player evolution failure; only that player's step is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolutionError {
    #[error("player {player} has corrupt performance history: {reason}")]
    CorruptHistory { player: PlayerId, reason: String },

    #[error("player {player} has invalid potential rating {potential}")]
    InvalidPotential { player: PlayerId, potential: u8 },

    #[error("player {player} did not appear in the box score")]
    MissingLine { player: PlayerId },
}

impl EvolutionError {
    pub fn player(&self) -> PlayerId {
        match self {
            EvolutionError::CorruptHistory { player, .. }
            | EvolutionError::InvalidPotential { player, .. }
            | EvolutionError::MissingLine { player } => *player,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange { field: &'static str, expected: &'static str, value: f64 },

    #[error("badge catalog references unknown badge '{badge}' in synergy '{synergy}'")]
    UnknownBadge { synergy: String, badge: String },

    #[error("duplicate badge id '{0}'")]
    DuplicateBadge(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ConfigError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConfigError::Io(_))
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
