use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::team::{TeamSide, ON_COURT};

/// Primary action chosen by the ball handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Drive,
    SpotUp,
    PostUp,
    Pass,
    /// Possession ended before a shot could be chosen.
    Turnover,
    /// Possession was skipped after an engine anomaly.
    NoOp,
}

impl ActionType {
    pub const CHOICES: [ActionType; 4] =
        [ActionType::Drive, ActionType::SpotUp, ActionType::PostUp, ActionType::Pass];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotKind {
    Rim,
    MidRange,
    Three,
    Post,
}

impl ShotKind {
    pub fn value(&self) -> u8 {
        match self {
            ShotKind::Three => 3,
            _ => 2,
        }
    }

    pub fn is_three(&self) -> bool {
        matches!(self, ShotKind::Three)
    }
}

/// How the possession ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PossessionResult {
    FieldGoal { shooter: PlayerId, shot: ShotKind, assisted_by: Option<PlayerId>, and_one: bool },
    FreeThrows { shooter: PlayerId, made: u8, attempted: u8 },
    DefensiveRebound { rebounder: PlayerId },
    Turnover { player: PlayerId, stolen_by: Option<PlayerId> },
    ShotClockViolation { player: PlayerId },
    NoOp,
}

/// Individual plays inside one possession, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Play {
    Shot {
        shooter: PlayerId,
        shot: ShotKind,
        made: bool,
        assisted_by: Option<PlayerId>,
        blocked_by: Option<PlayerId>,
    },
    Foul { by: PlayerId, on: PlayerId, shooting: bool },
    FreeThrow { shooter: PlayerId, made: bool },
    Rebound { player: PlayerId, offensive: bool },
    Turnover { player: PlayerId, stolen_by: Option<PlayerId> },
    ShotClockViolation { player: PlayerId },
}

/// Box-score counters contributed by one player in one possession.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    pub player: PlayerId,
    pub side: Option<TeamSide>,
    pub points: u16,
    pub fgm: u16,
    pub fga: u16,
    pub tpm: u16,
    pub tpa: u16,
    pub ftm: u16,
    pub fta: u16,
    pub oreb: u16,
    pub dreb: u16,
    pub ast: u16,
    pub stl: u16,
    pub blk: u16,
    pub tov: u16,
    pub pf: u16,
}

impl StatDelta {
    pub fn new(player: PlayerId, side: TeamSide) -> Self {
        Self { player, side: Some(side), ..Default::default() }
    }

    pub fn merge(&mut self, other: &StatDelta) {
        self.points += other.points;
        self.fgm += other.fgm;
        self.fga += other.fga;
        self.tpm += other.tpm;
        self.tpa += other.tpa;
        self.ftm += other.ftm;
        self.fta += other.fta;
        self.oreb += other.oreb;
        self.dreb += other.dreb;
        self.ast += other.ast;
        self.stl += other.stl;
        self.blk += other.blk;
        self.tov += other.tov;
        self.pf += other.pf;
    }
}

/// Transient result of one possession, folded into the box score right away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionOutcome {
    pub offense: TeamSide,
    pub ball_handler: PlayerId,
    pub action: ActionType,
    pub result: PossessionResult,
    pub elapsed_secs: f32,
    /// Points scored by the offense.
    pub points: u16,
    /// One row per involved player.
    pub deltas: Vec<StatDelta>,
    pub plays: Vec<Play>,
    pub on_court_home: [PlayerId; ON_COURT],
    pub on_court_away: [PlayerId; ON_COURT],
    pub description: String,
}

impl PossessionOutcome {
    /// Placeholder for a possession the engine could not resolve. Only time passes.
    pub fn no_op(
        offense: TeamSide,
        ball_handler: PlayerId,
        elapsed_secs: f32,
        on_court_home: [PlayerId; ON_COURT],
        on_court_away: [PlayerId; ON_COURT],
        reason: &str,
    ) -> Self {
        Self {
            offense,
            ball_handler,
            action: ActionType::NoOp,
            result: PossessionResult::NoOp,
            elapsed_secs,
            points: 0,
            deltas: Vec::new(),
            plays: Vec::new(),
            on_court_home,
            on_court_away,
            description: format!("possession skipped ({reason})"),
        }
    }

    pub fn on_court(&self, side: TeamSide) -> &[PlayerId; ON_COURT] {
        match side {
            TeamSide::Home => &self.on_court_home,
            TeamSide::Away => &self.on_court_away,
        }
    }

    /// Points scored by `side` in this possession.
    pub fn points_for(&self, side: TeamSide) -> u16 {
        self.deltas.iter().filter(|d| d.side == Some(side)).map(|d| d.points).sum()
    }

    /// Personal fouls charged to `side`.
    pub fn fouls_by(&self, side: TeamSide) -> impl Iterator<Item = (PlayerId, u16)> + '_ {
        self.deltas
            .iter()
            .filter(move |d| d.side == Some(side) && d.pf > 0)
            .map(|d| (d.player, d.pf))
    }

    pub fn is_no_op(&self) -> bool {
        matches!(self.result, PossessionResult::NoOp)
    }
}
