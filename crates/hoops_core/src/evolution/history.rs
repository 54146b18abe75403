//! Evolution audit trail.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EvolutionError;
use crate::models::{Attr, AttributeCategory, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionCause {
    Overperformance,
    Underperformance,
    HotStreak,
    ColdStreak,
    AgeGrowth,
    AgeDecline,
    /// Rating found outside `[attribute_floor, potential]` and pulled back.
    BoundsCorrection,
}

impl EvolutionCause {
    pub fn is_weekly(&self) -> bool {
        matches!(self, EvolutionCause::AgeGrowth | EvolutionCause::AgeDecline)
    }
}

/// One whole-point attribute change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEntry {
    pub player: PlayerId,
    pub category: AttributeCategory,
    pub attribute: Attr,
    pub delta: i8,
    pub cause: EvolutionCause,
    pub date: NaiveDate,
}

/// Everything one evolution cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvolutionReport {
    pub entries: Vec<EvolutionEntry>,
    /// Players whose step was skipped this cycle.
    pub skipped: Vec<EvolutionError>,
}

impl EvolutionReport {
    pub fn merge(&mut self, other: EvolutionReport) {
        self.entries.extend(other.entries);
        self.skipped.extend(other.skipped);
    }

    pub fn for_player(&self, player: PlayerId) -> impl Iterator<Item = &EvolutionEntry> {
        self.entries.iter().filter(move |e| e.player == player)
    }

    /// Net change per attribute for `player`.
    pub fn net_delta(&self, player: PlayerId, attribute: Attr) -> i32 {
        self.for_player(player).filter(|e| e.attribute == attribute).map(|e| e.delta as i32).sum()
    }

    pub fn skipped_players(&self) -> Vec<PlayerId> {
        self.skipped.iter().map(EvolutionError::player).collect()
    }
}
