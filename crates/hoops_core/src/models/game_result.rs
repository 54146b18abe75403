use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::events::GameEvent;
use super::player::{Injury, PlayerId};
use super::possession::PossessionOutcome;
use super::team::{TeamId, TeamSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress { period: u8 },
    Complete,
}

/// One player's line. Percentages stay `None` until finalised or when there
/// were no attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxLine {
    pub player: PlayerId,
    pub name: String,
    pub starter: bool,
    pub seconds: f32,
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
    pub plus_minus: i32,
    pub fg_pct: Option<f32>,
    pub tp_pct: Option<f32>,
    pub ft_pct: Option<f32>,
}

impl BoxLine {
    pub fn new(player: PlayerId, name: impl Into<String>, starter: bool) -> Self {
        Self { player, name: name.into(), starter, ..Default::default() }
    }

    pub fn minutes(&self) -> f32 {
        self.seconds / 60.0
    }

    pub fn rebounds(&self) -> u16 {
        self.oreb + self.dreb
    }

    pub fn played(&self) -> bool {
        self.seconds > 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTotals {
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
    pub possessions: u32,
    pub fg_pct: Option<f32>,
    pub tp_pct: Option<f32>,
    pub ft_pct: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamBox {
    pub team: TeamId,
    pub lines: Vec<BoxLine>,
    pub totals: TeamTotals,
}

impl TeamBox {
    pub fn line(&self, player: PlayerId) -> Option<&BoxLine> {
        self.lines.iter().find(|l| l.player == player)
    }

    /// Existing line for `player`, or a fresh bench line appended to the end.
    pub fn line_mut(&mut self, player: PlayerId) -> &mut BoxLine {
        let idx = match self.lines.iter().position(|l| l.player == player) {
            Some(idx) => idx,
            None => {
                self.lines.push(BoxLine::new(player, String::new(), false));
                self.lines.len() - 1
            }
        };
        &mut self.lines[idx]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub home: TeamBox,
    pub away: TeamBox,
}

impl BoxScore {
    pub fn side(&self, side: TeamSide) -> &TeamBox {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn side_mut(&mut self, side: TeamSide) -> &mut TeamBox {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    pub fn line(&self, player: PlayerId) -> Option<&BoxLine> {
        self.home.line(player).or_else(|| self.away.line(player))
    }

    pub fn lines(&self) -> impl Iterator<Item = (TeamSide, &BoxLine)> {
        self.home
            .lines
            .iter()
            .map(|l| (TeamSide::Home, l))
            .chain(self.away.lines.iter().map(|l| (TeamSide::Away, l)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodScore {
    pub period: u8,
    pub home: u16,
    pub away: u16,
}

/// Play-by-play entry: the folded outcome plus where it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionSummary {
    pub seq: u32,
    pub period: u8,
    pub clock_remaining: f32,
    pub outcome: PossessionOutcome,
    pub home_score: u16,
    pub away_score: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub player: PlayerId,
    pub team: TeamId,
    pub period: u8,
    pub injury: Injury,
}

/// Sealed record of a finished game. Built once by the simulator and never
/// mutated afterwards; the batch scheduler shares it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: u64,
    pub seed: u64,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_score: u16,
    pub away_score: u16,
    pub period_scores: Vec<PeriodScore>,
    pub overtime_periods: u8,
    pub box_score: BoxScore,
    pub play_by_play: Vec<PossessionSummary>,
    pub events: Vec<GameEvent>,
    pub injuries: Vec<InjuryReport>,
    pub final_fatigue: BTreeMap<PlayerId, f32>,
    pub skipped_possessions: u32,
    pub completed: bool,
}

impl GameResult {
    pub fn winner(&self) -> Option<TeamSide> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn winner_team(&self) -> Option<TeamId> {
        self.winner().map(|side| match side {
            TeamSide::Home => self.home_team,
            TeamSide::Away => self.away_team,
        })
    }

    pub fn total_possessions(&self) -> usize {
        self.play_by_play.len()
    }

    /// SHA-256 of the canonical JSON form, hex encoded.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }
}
