pub mod context;
pub mod events;
pub mod game_result;
pub mod player;
pub mod possession;
pub mod team;

pub use context::CampaignContext;
pub use events::{GameEvent, GameEventKind, SubstitutionReason};
pub use game_result::{
    BoxLine, BoxScore, GameResult, GameStatus, InjuryReport, PeriodScore, PossessionSummary,
    TeamBox, TeamTotals,
};
pub use player::{
    Attr, AttributeCategory, Attributes, Badge, BadgeLevel, Injury, InjuryRisk, InjurySeverity,
    InjuryType, Player, PlayerId, Position, StatCounters, Tendencies, MAX_FATIGUE, MAX_RATING,
    NEUTRAL_RATING,
};
pub use possession::{ActionType, Play, PossessionOutcome, PossessionResult, ShotKind, StatDelta};
pub use team::{
    CoachingScheme, DefenseStyle, OffenseStyle, StartingLineup, Team, TeamId, TeamModifiers,
    TeamSide, ON_COURT,
};
